//! Dotgrid Core Types and Definitions
//!
//! This crate provides the foundational types for the dotgrid chart engine.
//! It includes:
//!
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Styles**: Validated per-group visual attributes ([`style`] module)
//! - **Frames**: A small ordered tabular container ([`frame`] module)

pub mod color;
pub mod frame;
pub mod geometry;
pub mod style;
