//! Dotgrid - a dot-grid chart layout engine with SVG rendering.
//!
//! Dotgrid positions circular markers into grouped, fixed-capacity columns
//! (the isotype/pictogram chart style) and renders the result as SVG. The
//! layout engine is a deterministic single pass: each input row becomes one
//! positioned circle, and each group closes with a summary carrying its
//! label position and a vertical gridline position.

pub mod config;
pub mod export;
pub mod layout;

mod error;

pub use dotgrid_core::{color, frame, geometry, style};

pub use error::DotgridError;

use log::info;

use dotgrid_core::frame::Frame;

use config::AppConfig;
use export::Exporter;
use layout::{CircleLayout, LayoutItem};

/// Builder for laying out and rendering dot-grid charts.
///
/// This wraps an [`AppConfig`] and exposes the two stages of the pipeline:
/// [`ChartBuilder::layout`] turns a frame into a placement/summary stream,
/// and [`ChartBuilder::render_svg`] turns that stream into an SVG document.
///
/// # Examples
///
/// ```
/// use dotgrid::{ChartBuilder, config::AppConfig};
/// use dotgrid::frame::{Frame, Value};
///
/// let raw = r##"
///     [style.groups]
///     Dem = ["#00aef3", 0.8, "Democrat"]
/// "##;
/// let config: AppConfig = toml::from_str(raw).expect("valid TOML");
///
/// let mut frame = Frame::new(["party", "chance"]).expect("distinct columns");
/// frame
///     .push_row(vec![Value::from("Dem"), Value::from(0.9)])
///     .expect("row matches columns");
///
/// let builder = ChartBuilder::new(config);
/// let items = builder.layout(&frame, "party", &["chance"]).expect("layout");
/// let svg = builder.render_svg(&items).expect("render");
/// assert!(svg.contains("<svg"));
/// ```
#[derive(Default)]
pub struct ChartBuilder {
    config: AppConfig,
}

impl ChartBuilder {
    /// Create a new chart builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the wrapped configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Lays out the frame into a placement/summary stream, grouping rows by
    /// the `group` column and ordering each group descending over the
    /// `order` columns.
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate, when the group or an
    /// order column is missing from the frame, or when a group in the data
    /// has no configured style.
    pub fn layout(
        &self,
        frame: &Frame,
        group: &str,
        order: &[&str],
    ) -> Result<Vec<LayoutItem>, DotgridError> {
        let layout_config = self.config.layout_config()?;
        let styles = self.config.style_map()?;

        info!(group, rows = frame.len(); "Laying out chart");
        let items = CircleLayout::new(&layout_config, &styles).generate(frame, group, order)?;
        Ok(items)
    }

    /// Renders a placement/summary stream to an SVG document string.
    pub fn render_svg(&self, items: &[LayoutItem]) -> Result<String, DotgridError> {
        let layout_config = self.config.layout_config()?;
        let styles = self.config.style_map()?;
        let background = self.config.style().background_color()?;

        info!(items = items.len(); "Rendering chart to SVG");
        let svg = Exporter::new(&layout_config, &styles, background).render(items)?;
        Ok(svg)
    }
}
