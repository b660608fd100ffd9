//! CLI logic for the dotgrid chart tool.
//!
//! This module contains the core CLI logic: load configuration, run the
//! election ETL pipeline, lay out the chart, and write the SVG.

mod args;

pub use args::Args;

use std::fs;

use log::info;
use thiserror::Error;

use dotgrid::{ChartBuilder, DotgridError, config::AppConfig, config::ConfigError};
use dotgrid_etl::{ElectionPipeline, EtlError, SourcePaths};

/// Built-in configuration used when no `--config` file is given: one style
/// per race-forecast bucket, so a default invocation grouped on
/// `race_forecast` renders without a configuration file.
const DEFAULT_CONFIG: &str = r##"
[style]
background_color = "white"

[style.groups]
"Solid-R" = ["#d30b0d", 1.0, "Solid Republican"]
"Likely-R" = ["#d30b0d", 0.75, "Likely Republican"]
"Lean-R" = ["#d30b0d", 0.5, "Lean Republican"]
"Solid-D" = ["#00aef3", 1.0, "Solid Democrat"]
"Likely-D" = ["#00aef3", 0.75, "Likely Democrat"]
"Lean-D" = ["#00aef3", 0.5, "Lean Democrat"]
"Toss-Up" = ["#a059aa", 0.75, "Toss-Up"]
"##;

/// The error type for CLI runs.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Etl(#[from] EtlError),

    #[error(transparent)]
    Chart(#[from] DotgridError),
}

/// Run the dotgrid CLI application
///
/// This function runs the election pipeline over the source CSVs, lays out
/// the resulting frame as a dot-grid chart, and writes the SVG to the
/// output file.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Source loading and join errors
/// - Layout errors (missing columns or unstyled groups)
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        results = args.results,
        output_path = args.output;
        "Processing election chart"
    );

    // Load configuration, falling back to the built-in bucket styles
    let app_config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => toml::from_str(DEFAULT_CONFIG).map_err(ConfigError::Toml)?,
    };

    // Run the ETL pipeline and materialize the joined frame
    let pipeline = ElectionPipeline::new(SourcePaths {
        results: args.results.clone().into(),
        name_mappings: args.name_mappings.clone().into(),
        house_toplines: args.house_toplines.clone().into(),
        senate_toplines: args.senate_toplines.clone().into(),
        stances: args.stances.clone().into(),
    });
    let set = pipeline.run()?;
    let frame = pipeline.to_frame(&set)?;

    // Lay out and render using the ChartBuilder API
    let builder = ChartBuilder::new(app_config);
    let order: Vec<&str> = args.order.iter().map(String::as_str).collect();
    let items = builder.layout(&frame, &args.group, &order)?;
    let svg = builder.render_svg(&items)?;

    // Write output file
    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
