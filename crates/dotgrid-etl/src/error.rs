//! Error types for the election ETL pipeline.

use std::io;

use thiserror::Error;

use dotgrid_core::frame::FrameError;

/// The main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("source file does not contain column `{0}`")]
    MissingColumn(String),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}
