//! Validated per-group visual attributes.
//!
//! Each group of circles in a chart carries a fill color, an opacity, and a
//! display label. These are configured by the caller and validated here at
//! construction time, so the layout engine never observes an invalid style.
//!
//! # Opacity policy
//!
//! Opacity must satisfy `0 < opacity <= 1`: fully opaque (`1.0`) is accepted,
//! fully transparent (`0.0`), negative, and non-finite values are rejected.

use indexmap::IndexMap;
use thiserror::Error;

use crate::color::Color;

/// Errors raised while validating group styles.
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("{0}")]
    InvalidColor(String),

    #[error("opacity must be in (0, 1], got {0}")]
    OpacityOutOfRange(f64),
}

/// The visual attributes of one group of circles.
///
/// # Examples
///
/// ```
/// # use dotgrid_core::style::GroupStyle;
/// let style = GroupStyle::new("#00aef3", 0.8, "Democrat").unwrap();
/// assert_eq!(style.label(), "Democrat");
/// assert!(GroupStyle::new("#00aef3", 0.0, "Democrat").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStyle {
    color: Color,
    opacity: f64,
    label: String,
}

impl GroupStyle {
    /// Creates a validated style from a CSS color string, an opacity, and a
    /// display label.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidColor`] when the color string does not
    /// parse, and [`StyleError::OpacityOutOfRange`] when the opacity falls
    /// outside `(0, 1]` (non-finite values included).
    pub fn new(color: &str, opacity: f64, label: impl Into<String>) -> Result<Self, StyleError> {
        let color = Color::new(color).map_err(StyleError::InvalidColor)?;
        if !(opacity > 0.0 && opacity <= 1.0) {
            return Err(StyleError::OpacityOutOfRange(opacity));
        }
        Ok(Self {
            color,
            opacity,
            label: label.into(),
        })
    }

    /// Returns the fill color for circles in this group.
    pub fn color(&self) -> &Color {
        &self.color
    }

    /// Returns the fill opacity for circles in this group.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Returns the display label for this group.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A mapping from group identifier to [`GroupStyle`], in insertion order.
///
/// The layout engine looks styles up by the group's display string when it
/// closes a group; a group present in the data but absent here is a fatal
/// layout error for that invocation.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    styles: IndexMap<String, GroupStyle>,
}

impl StyleMap {
    /// Creates an empty style map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a style map from `(group, color, opacity, label)` entries,
    /// validating each style in turn.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, StyleError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, f64, &'a str)>,
    {
        let mut map = Self::new();
        for (group, color, opacity, label) in entries {
            map.insert(group, GroupStyle::new(color, opacity, label)?);
        }
        Ok(map)
    }

    /// Inserts or replaces the style for a group.
    pub fn insert(&mut self, group: impl Into<String>, style: GroupStyle) {
        self.styles.insert(group.into(), style);
    }

    /// Looks up the style for a group, if configured.
    pub fn get(&self, group: &str) -> Option<&GroupStyle> {
        self.styles.get(group)
    }

    /// Returns the number of configured groups.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Returns true when no group has a configured style.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Iterates over `(group, style)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupStyle)> {
        self.styles.iter().map(|(k, v)| (k.as_str(), v))
    }
}
