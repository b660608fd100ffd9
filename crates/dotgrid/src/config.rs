//! Configuration types for dotgrid chart layout and styling.
//!
//! This module provides two layers of configuration:
//!
//! - [`AppConfig`] - the raw, serde-deserializable application configuration
//!   (loadable from a TOML file), combining a `[chart]` section and a
//!   `[style]` section.
//! - [`LayoutConfig`] - the validated layout parameters the engine actually
//!   runs with. Construction and every setter re-validate, so the layout
//!   algorithm never observes an invalid configuration.
//!
//! # Example
//!
//! ```
//! # use dotgrid::config::LayoutConfig;
//! let config = LayoutConfig::default();
//! assert_eq!(config.radius(), 0.2);
//! assert_eq!(config.pad(), 0.4);
//! assert_eq!(config.group_margin(), 0.8);
//! ```

use std::{fs, path::Path, path::PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use dotgrid_core::{
    color::Color,
    style::{StyleError, StyleMap},
};

/// Errors raised while validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("radius must be greater than 0, got {0}")]
    NonPositiveRadius(f64),

    #[error("{field} must be greater than or equal to 0, got {value}")]
    NegativeCoordinate { field: &'static str, value: f64 },

    #[error("circles_per_column must be at least 1")]
    ZeroColumnCapacity,

    #[error("pad must be greater than or equal to 0, got {0}")]
    NegativePad(f64),

    #[error("configuration file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Validated layout parameters for the circle layout engine.
///
/// `pad` is the extra horizontal gap between groups beyond the per-circle
/// diameter. It is derived from the radius (`2 * radius`) unless explicitly
/// overridden with [`LayoutConfig::set_pad`]; reassigning the radius discards
/// any override so the derived value tracks the new radius.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    radius: f64,
    x_init: f64,
    y_init: f64,
    circles_per_column: usize,
    pad: Option<f64>,
}

impl LayoutConfig {
    /// Creates a validated layout configuration.
    ///
    /// # Errors
    ///
    /// Rejects a non-positive or non-finite radius, negative origin
    /// coordinates, and a zero column capacity.
    pub fn new(
        radius: f64,
        x_init: f64,
        y_init: f64,
        circles_per_column: usize,
    ) -> Result<Self, ConfigError> {
        let mut config = Self {
            radius: 0.2,
            x_init: 0.0,
            y_init: 1.0,
            circles_per_column: 10,
            pad: None,
        };
        config.set_radius(radius)?;
        config.set_x_init(x_init)?;
        config.set_y_init(y_init)?;
        config.set_circles_per_column(circles_per_column)?;
        Ok(config)
    }

    /// Returns the circle radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Sets the circle radius, discarding any explicit pad override.
    pub fn set_radius(&mut self, radius: f64) -> Result<(), ConfigError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(ConfigError::NonPositiveRadius(radius));
        }
        self.pad = None;
        self.radius = radius;
        Ok(())
    }

    /// Returns the extra horizontal gap between groups: the explicit
    /// override if one is set, otherwise `2 * radius`.
    pub fn pad(&self) -> f64 {
        self.pad.unwrap_or(2.0 * self.radius)
    }

    /// Overrides the derived pad value.
    pub fn set_pad(&mut self, pad: f64) -> Result<(), ConfigError> {
        if !(pad >= 0.0 && pad.is_finite()) {
            return Err(ConfigError::NegativePad(pad));
        }
        self.pad = Some(pad);
        Ok(())
    }

    /// Returns the x-coordinate of the first circle.
    pub fn x_init(&self) -> f64 {
        self.x_init
    }

    /// Sets the x-coordinate of the first circle.
    pub fn set_x_init(&mut self, x_init: f64) -> Result<(), ConfigError> {
        if !(x_init >= 0.0 && x_init.is_finite()) {
            return Err(ConfigError::NegativeCoordinate {
                field: "x_init",
                value: x_init,
            });
        }
        self.x_init = x_init;
        Ok(())
    }

    /// Returns the y-coordinate of the first circle.
    pub fn y_init(&self) -> f64 {
        self.y_init
    }

    /// Sets the y-coordinate of the first circle.
    pub fn set_y_init(&mut self, y_init: f64) -> Result<(), ConfigError> {
        if !(y_init >= 0.0 && y_init.is_finite()) {
            return Err(ConfigError::NegativeCoordinate {
                field: "y_init",
                value: y_init,
            });
        }
        self.y_init = y_init;
        Ok(())
    }

    /// Returns the vertical capacity of one column.
    pub fn circles_per_column(&self) -> usize {
        self.circles_per_column
    }

    /// Sets the vertical capacity of one column.
    pub fn set_circles_per_column(&mut self, circles_per_column: usize) -> Result<(), ConfigError> {
        if circles_per_column == 0 {
            return Err(ConfigError::ZeroColumnCapacity);
        }
        self.circles_per_column = circles_per_column;
        Ok(())
    }

    /// Horizontal spacing inserted before a group's first column.
    pub fn group_margin(&self) -> f64 {
        2.0 * self.radius + self.pad()
    }

    /// Spacing between columns within a group and between stacked circles.
    pub fn circle_margin(&self) -> f64 {
        3.0 * self.radius
    }

    /// The y-coordinate of the group label row. Constant across groups, so
    /// every label lands on one global row above the tallest possible column.
    pub fn label_row_y(&self) -> f64 {
        self.y_init + self.circle_margin() * self.circles_per_column as f64
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radius: 0.2,
            x_init: 0.0,
            y_init: 1.0,
            circles_per_column: 10,
            pad: None,
        }
    }
}

/// One raw style entry: `(color, opacity, label)`.
type StyleEntry = (String, f64, String);

/// Raw `[chart]` section of the application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    radius: f64,
    x_init: f64,
    y_init: f64,
    circles_per_column: usize,
    pad: Option<f64>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            radius: 0.2,
            x_init: 0.0,
            y_init: 1.0,
            circles_per_column: 10,
            pad: None,
        }
    }
}

/// Raw `[style]` section of the application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    groups: IndexMap<String, StyleEntry>,
}

impl StyleConfig {
    /// Parses and returns the configured background color, if any.
    pub fn background_color(&self) -> Result<Option<Color>, StyleError> {
        self.background_color
            .as_deref()
            .map(|raw| Color::new(raw).map_err(StyleError::InvalidColor))
            .transpose()
    }

    /// Returns the raw `(color, opacity, label)` entries per group.
    pub fn groups(&self) -> &IndexMap<String, StyleEntry> {
        &self.groups
    }
}

/// Top-level application configuration combining chart and style settings.
///
/// Deserializable from TOML:
///
/// ```toml
/// [chart]
/// radius = 0.2
/// circles_per_column = 10
///
/// [style]
/// background_color = "white"
///
/// [style.groups]
/// Dem = ["#00aef3", 0.8, "Democrat"]
/// Rep = ["#d30b0d", 0.8, "Republican"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chart layout section.
    chart: ChartConfig,

    /// Style section.
    style: StyleConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|_| ConfigError::MissingFile(path.to_path_buf()))?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Returns the raw chart section.
    pub fn chart(&self) -> &ChartConfig {
        &self.chart
    }

    /// Returns the raw style section.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Validates the chart section into a [`LayoutConfig`].
    pub fn layout_config(&self) -> Result<LayoutConfig, ConfigError> {
        let mut config = LayoutConfig::new(
            self.chart.radius,
            self.chart.x_init,
            self.chart.y_init,
            self.chart.circles_per_column,
        )?;
        if let Some(pad) = self.chart.pad {
            config.set_pad(pad)?;
        }
        Ok(config)
    }

    /// Validates the per-group style entries into a [`StyleMap`].
    pub fn style_map(&self) -> Result<StyleMap, StyleError> {
        StyleMap::from_entries(self.style.groups.iter().map(
            |(group, (color, opacity, label))| {
                (group.as_str(), color.as_str(), *opacity, label.as_str())
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_layout_config_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.radius(), 0.2);
        assert_eq!(config.x_init(), 0.0);
        assert_eq!(config.y_init(), 1.0);
        assert_eq!(config.circles_per_column(), 10);
        assert!(approx_eq!(f64, config.pad(), 0.4));
    }

    #[test]
    fn test_layout_config_rejects_bad_values() {
        assert!(LayoutConfig::new(0.0, 0.0, 1.0, 10).is_err());
        assert!(LayoutConfig::new(-0.2, 0.0, 1.0, 10).is_err());
        assert!(LayoutConfig::new(f64::NAN, 0.0, 1.0, 10).is_err());
        assert!(LayoutConfig::new(0.2, -1.0, 1.0, 10).is_err());
        assert!(LayoutConfig::new(0.2, 0.0, -1.0, 10).is_err());
        assert!(LayoutConfig::new(0.2, 0.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_pad_derives_from_radius() {
        let mut config = LayoutConfig::new(0.5, 0.0, 1.0, 10).unwrap();
        assert!(approx_eq!(f64, config.pad(), 1.0));

        config.set_radius(0.1).unwrap();
        assert!(approx_eq!(f64, config.pad(), 0.2));
    }

    #[test]
    fn test_pad_override_discarded_on_radius_change() {
        let mut config = LayoutConfig::default();
        config.set_pad(1.5).unwrap();
        assert!(approx_eq!(f64, config.pad(), 1.5));

        config.set_radius(0.3).unwrap();
        assert!(approx_eq!(f64, config.pad(), 0.6));
    }

    #[test]
    fn test_margins() {
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 10).unwrap();
        assert!(approx_eq!(f64, config.group_margin(), 0.8));
        assert!(approx_eq!(f64, config.circle_margin(), 0.6));
        assert!(approx_eq!(f64, config.label_row_y(), 7.0));
    }

    #[test]
    fn test_setter_rejects_then_keeps_old_value() {
        let mut config = LayoutConfig::default();
        assert!(config.set_radius(-1.0).is_err());
        assert_eq!(config.radius(), 0.2);
    }

    #[test]
    fn test_app_config_from_toml() {
        let raw = r##"
            [chart]
            radius = 0.25
            circles_per_column = 5

            [style]
            background_color = "white"

            [style.groups]
            Dem = ["#00aef3", 0.8, "Democrat"]
            Rep = ["#d30b0d", 0.8, "Republican"]
        "##;

        let config: AppConfig = toml::from_str(raw).unwrap();
        let layout = config.layout_config().unwrap();
        assert_eq!(layout.radius(), 0.25);
        assert_eq!(layout.circles_per_column(), 5);
        // y_init falls back to its default
        assert_eq!(layout.y_init(), 1.0);

        let styles = config.style_map().unwrap();
        assert_eq!(styles.len(), 2);
        assert_eq!(styles.get("Dem").unwrap().label(), "Democrat");

        assert!(config.style().background_color().unwrap().is_some());
    }

    #[test]
    fn test_app_config_rejects_invalid_style() {
        let raw = r##"
            [style.groups]
            Dem = ["#00aef3", 0.0, "Democrat"]
        "##;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert!(config.style_map().is_err());
    }

    #[test]
    fn test_app_config_missing_file() {
        let result = AppConfig::load("/definitely/not/a/real/path.toml");
        assert!(matches!(result, Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_app_config_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chart]\nradius = 0.5").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.layout_config().unwrap().radius(), 0.5);
    }
}
