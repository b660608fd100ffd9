//! Command-line argument definitions for the dotgrid CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments name the source CSV files, the chart grouping
//! and ordering columns, output path, configuration file, and logging
//! verbosity.

use clap::Parser;

/// Command-line arguments for the dotgrid chart tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the election results CSV
    #[arg(long)]
    pub results: String,

    /// Path to the name-mapping crosswalk CSV
    #[arg(long)]
    pub name_mappings: String,

    /// Path to the House district toplines CSV
    #[arg(long)]
    pub house_toplines: String,

    /// Path to the Senate state toplines CSV
    #[arg(long)]
    pub senate_toplines: String,

    /// Path to the stance annotations CSV
    #[arg(long)]
    pub stances: String,

    /// Frame column to group circles by
    #[arg(long, default_value = "race_forecast")]
    pub group: String,

    /// Frame column(s) to order circles by, descending
    #[arg(long, default_value = "chance_of_winning", value_delimiter = ',')]
    pub order: Vec<String>,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
