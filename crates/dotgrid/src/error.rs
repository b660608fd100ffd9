//! Error types for dotgrid operations.
//!
//! This module provides the main error type [`DotgridError`] which wraps the
//! error conditions that can occur while configuring, laying out, and
//! rendering a chart.

use std::io;

use thiserror::Error;

use dotgrid_core::{frame::FrameError, style::StyleError};

use crate::{config::ConfigError, export::ExportError, layout::LayoutError};

/// The main error type for dotgrid operations.
#[derive(Debug, Error)]
pub enum DotgridError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Style error: {0}")]
    Style(#[from] StyleError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}
