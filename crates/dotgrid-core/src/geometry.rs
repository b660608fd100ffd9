//! Geometric primitives for chart layout and positioning.
//!
//! This module provides the basic geometric types used throughout dotgrid
//! for placing circles and computing the extent of a finished chart.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in chart space
//! - [`Bounds`] - An axis-aligned bounding box grown point by point
//!
//! Chart coordinates are `f64` data-space values, not pixels: the layout
//! engine works in whatever units the caller's radius and origin imply, and
//! the SVG exporter maps them to screen space at render time.

/// A 2D point representing a position in chart coordinate space.
///
/// # Examples
///
/// ```
/// # use dotgrid_core::geometry::Point;
/// let p = Point::new(0.8, 1.6);
/// assert_eq!(p.x(), 0.8);
/// assert_eq!(p.y(), 1.6);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns a copy of this point with the specified x-coordinate
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// Returns a copy of this point with the specified y-coordinate
    pub fn with_y(mut self, y: f64) -> Self {
        self.y = y;
        self
    }

    /// Returns this point translated by the given offsets.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An axis-aligned bounding box in chart coordinate space.
///
/// A fresh `Bounds` is empty; growing it with [`Bounds::include`] expands the
/// box to cover each point in turn. The exporter uses this to compute the
/// view box of the rendered chart.
///
/// # Examples
///
/// ```
/// # use dotgrid_core::geometry::{Bounds, Point};
/// let mut bounds = Bounds::new();
/// bounds.include(Point::new(1.0, 2.0));
/// bounds.include(Point::new(-1.0, 5.0));
/// assert_eq!(bounds.width(), 2.0);
/// assert_eq!(bounds.height(), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Creates an empty bounding box covering no points.
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Returns true if no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    /// Grows the box to cover the given point.
    pub fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x());
        self.min_y = self.min_y.min(point.y());
        self.max_x = self.max_x.max(point.x());
        self.max_y = self.max_y.max(point.y());
    }

    /// Grows the box outward by `margin` on every side.
    pub fn expand(&mut self, margin: f64) {
        if !self.is_empty() {
            self.min_x -= margin;
            self.min_y -= margin;
            self.max_x += margin;
            self.max_y += margin;
        }
    }

    /// Returns the minimum x-coordinate covered.
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Returns the minimum y-coordinate covered.
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Returns the maximum x-coordinate covered.
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Returns the maximum y-coordinate covered.
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Returns the width of the box, or zero when empty.
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    /// Returns the height of the box, or zero when empty.
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_default() {
        let point = Point::default();
        assert_eq!(point.x(), 0.0);
        assert_eq!(point.y(), 0.0);
    }

    #[test]
    fn test_point_with_coordinates() {
        let point = Point::new(1.0, 2.0).with_x(5.0).with_y(-1.0);
        assert_eq!(point.x(), 5.0);
        assert_eq!(point.y(), -1.0);
    }

    #[test]
    fn test_point_translate() {
        let point = Point::new(1.0, 2.0).translate(0.5, -0.5);
        assert_eq!(point.x(), 1.5);
        assert_eq!(point.y(), 1.5);
    }

    #[test]
    fn test_bounds_empty() {
        let bounds = Bounds::new();
        assert!(bounds.is_empty());
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
    }

    #[test]
    fn test_bounds_include() {
        let mut bounds = Bounds::new();
        bounds.include(Point::new(1.0, 1.0));
        assert!(!bounds.is_empty());
        assert_eq!(bounds.width(), 0.0);

        bounds.include(Point::new(3.0, -2.0));
        assert_eq!(bounds.min_x(), 1.0);
        assert_eq!(bounds.min_y(), -2.0);
        assert_eq!(bounds.max_x(), 3.0);
        assert_eq!(bounds.max_y(), 1.0);
        assert_eq!(bounds.width(), 2.0);
        assert_eq!(bounds.height(), 3.0);
    }

    #[test]
    fn test_bounds_expand() {
        let mut bounds = Bounds::new();
        bounds.include(Point::new(0.0, 0.0));
        bounds.include(Point::new(2.0, 2.0));
        bounds.expand(0.5);
        assert_eq!(bounds.min_x(), -0.5);
        assert_eq!(bounds.max_y(), 2.5);
        assert_eq!(bounds.width(), 3.0);
    }

    #[test]
    fn test_bounds_expand_empty_stays_empty() {
        let mut bounds = Bounds::new();
        bounds.expand(1.0);
        assert!(bounds.is_empty());
    }

    // ===================
    // Property Tests
    // ===================

    use proptest::prelude::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0..1000.0f64, -1000.0..1000.0f64).prop_map(|(x, y)| Point::new(x, y))
    }

    /// Including points in either order should grow the same box.
    fn check_include_is_order_independent(p1: Point, p2: Point) -> Result<(), TestCaseError> {
        let mut first = Bounds::new();
        first.include(p1);
        first.include(p2);

        let mut second = Bounds::new();
        second.include(p2);
        second.include(p1);

        prop_assert_eq!(first, second);
        Ok(())
    }

    /// Every included point should lie inside the box.
    fn check_include_covers_point(points: Vec<Point>) -> Result<(), TestCaseError> {
        let mut bounds = Bounds::new();
        for point in &points {
            bounds.include(*point);
        }
        for point in &points {
            prop_assert!(point.x() >= bounds.min_x() && point.x() <= bounds.max_x());
            prop_assert!(point.y() >= bounds.min_y() && point.y() <= bounds.max_y());
        }
        Ok(())
    }

    /// Expanding a non-empty box should grow width and height by twice the
    /// margin.
    fn check_expand_grows_extent(p1: Point, p2: Point, margin: f64) -> Result<(), TestCaseError> {
        let mut bounds = Bounds::new();
        bounds.include(p1);
        bounds.include(p2);
        let width = bounds.width();
        let height = bounds.height();

        bounds.expand(margin);
        prop_assert!(approx_eq!(f64, bounds.width(), width + 2.0 * margin, epsilon = 1e-9));
        prop_assert!(approx_eq!(f64, bounds.height(), height + 2.0 * margin, epsilon = 1e-9));
        Ok(())
    }

    /// Translating there and back should return to the start.
    fn check_translate_inverse(p: Point, dx: f64, dy: f64) -> Result<(), TestCaseError> {
        let roundtrip = p.translate(dx, dy).translate(-dx, -dy);
        prop_assert!(approx_eq!(f64, roundtrip.x(), p.x(), epsilon = 1e-9));
        prop_assert!(approx_eq!(f64, roundtrip.y(), p.y(), epsilon = 1e-9));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn include_is_order_independent(p1 in point_strategy(), p2 in point_strategy()) {
            check_include_is_order_independent(p1, p2)?;
        }

        #[test]
        fn include_covers_point(points in proptest::collection::vec(point_strategy(), 1..20)) {
            check_include_covers_point(points)?;
        }

        #[test]
        fn expand_grows_extent(p1 in point_strategy(), p2 in point_strategy(), margin in 0.0..100.0f64) {
            check_expand_grows_extent(p1, p2, margin)?;
        }

        #[test]
        fn translate_inverse(p in point_strategy(), dx in -100.0..100.0f64, dy in -100.0..100.0f64) {
            check_translate_inverse(p, dx, dy)?;
        }
    }
}
