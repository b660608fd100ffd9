//! SVG rendering of a generated layout stream.
//!
//! The exporter consumes the [`LayoutItem`] stream produced by the layout
//! engine and builds an SVG document: one filled circle per placement, and
//! one text label plus one vertical reference line per group summary. The
//! view box is computed from the extent of the emitted geometry.
//!
//! Layout coordinates grow upward while SVG's y-axis grows downward, so
//! every y-value is flipped across the vertical center of the chart bounds
//! at render time.

use log::debug;
use svg::{
    Document,
    node::element::{Circle, Line, Rectangle, Text},
};
use thiserror::Error;

use dotgrid_core::{
    color::Color,
    geometry::{Bounds, Point},
    style::StyleMap,
};

use crate::{config::LayoutConfig, layout::LayoutItem};

/// Errors raised while rendering a layout stream.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no style configured for group `{0}`")]
    MissingStyle(String),
}

/// Renders a layout stream to an SVG document.
pub struct Exporter<'a> {
    config: &'a LayoutConfig,
    styles: &'a StyleMap,
    background: Option<Color>,
}

impl<'a> Exporter<'a> {
    /// Creates an exporter over a validated configuration and style map.
    pub fn new(config: &'a LayoutConfig, styles: &'a StyleMap, background: Option<Color>) -> Self {
        Self {
            config,
            styles,
            background,
        }
    }

    /// Renders the stream to a complete SVG document string.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MissingStyle`] when a placement references a
    /// group with no configured style. The layout engine enforces this at
    /// generation time, so this only fires for hand-built streams.
    pub fn render(&self, items: &[LayoutItem]) -> Result<String, ExportError> {
        let bounds = self.measure(items);
        debug!(items = items.len(); "Rendering layout stream to SVG");

        let mut document = Document::new().set(
            "viewBox",
            (bounds.min_x(), bounds.min_y(), bounds.width(), bounds.height()),
        );

        if let Some(background) = &self.background {
            document = document.add(
                Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("fill", background),
            );
        }

        // Gridlines sit behind circles, labels on top, regardless of how the
        // stream interleaves them.
        for item in items {
            if let LayoutItem::Label(summary) = item {
                document = document.add(
                    Line::new()
                        .set("x1", summary.gridline_x())
                        .set("y1", bounds.min_y())
                        .set("x2", summary.gridline_x())
                        .set("y2", bounds.max_y())
                        .set("stroke", "#cccccc")
                        .set("stroke-width", self.config.radius() / 4.0),
                );
            }
        }

        for item in items {
            if let LayoutItem::Circle(placement) = item {
                let group = placement.group().to_string();
                let style = self
                    .styles
                    .get(&group)
                    .ok_or(ExportError::MissingStyle(group))?;

                document = document.add(
                    Circle::new()
                        .set("cx", placement.x())
                        .set("cy", self.flip_y(&bounds, placement.y()))
                        .set("r", self.config.radius())
                        .set("fill", style.color())
                        .set("fill-opacity", style.opacity())
                        // the white halo stroke from the original plot style,
                        // scaled to the radius since coordinates are data units
                        .set("stroke", "white")
                        .set("stroke-width", self.config.radius() / 5.0),
                );
            }
        }

        for item in items {
            if let LayoutItem::Label(summary) = item {
                let text = format!("{} ({})", summary.group_sublabel(), summary.group_count());
                document = document.add(
                    Text::new(text)
                        .set("x", summary.label_x())
                        .set("y", self.flip_y(&bounds, summary.label_y()))
                        .set("text-anchor", "middle")
                        .set("font-size", self.config.circle_margin()),
                );
            }
        }

        Ok(document.to_string())
    }

    /// Computes the chart bounds over every emitted circle, label, and
    /// gridline, padded by one group margin.
    fn measure(&self, items: &[LayoutItem]) -> Bounds {
        let mut bounds = Bounds::new();
        for item in items {
            match item {
                LayoutItem::Circle(placement) => bounds.include(placement.position()),
                LayoutItem::Label(summary) => {
                    bounds.include(Point::new(summary.label_x(), summary.label_y()));
                    bounds.include(Point::new(summary.gridline_x(), self.config.y_init()));
                }
            }
        }
        bounds.expand(self.config.group_margin());
        bounds
    }

    /// Maps an upward-growing layout y-coordinate into SVG's downward axis.
    fn flip_y(&self, bounds: &Bounds, y: f64) -> f64 {
        bounds.min_y() + bounds.max_y() - y
    }
}
