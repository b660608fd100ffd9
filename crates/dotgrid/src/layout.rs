//! The circle layout engine.
//!
//! Given a [`Frame`], a group column, and one or more order columns, the
//! engine assigns every row a position on the plane: rows of the same group
//! pack top-to-bottom into fixed-capacity columns, columns wrap rightward,
//! and groups are separated by a fixed horizontal margin. The result is an
//! ordered stream of [`LayoutItem`]s: one [`CirclePlacement`] per row, and
//! exactly one [`GroupSummary`] immediately after each group's last
//! placement, carrying the group's label position and gridline position.
//!
//! Groups are visited in the order their keys first appear in the frame,
//! and rows within a group are placed in stable descending order of the
//! order columns. The whole pass is a pure function of the configuration
//! and the frame: re-running it yields an identical stream.

use log::{debug, trace};
use thiserror::Error;

use dotgrid_core::{
    frame::{Frame, FrameError, Row, Value},
    geometry::Point,
    style::StyleMap,
};

use crate::config::LayoutConfig;

/// Errors raised while generating a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("frame does not contain group column `{0}`")]
    MissingGroupColumn(String),

    #[error("frame does not contain order column `{0}`")]
    MissingOrderColumn(String),

    #[error("no style configured for group `{0}`")]
    MissingStyle(String),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// One item of the generated layout stream.
#[derive(Debug, Clone)]
pub enum LayoutItem {
    /// A positioned circle for one input row.
    Circle(CirclePlacement),
    /// The closing summary for one group.
    Label(GroupSummary),
}

/// A positioned circle for one input row.
#[derive(Debug, Clone)]
pub struct CirclePlacement {
    group: Value,
    count: usize,
    row: Row,
    position: Point,
}

impl CirclePlacement {
    /// Returns the group identifier this circle belongs to.
    pub fn group(&self) -> &Value {
        &self.group
    }

    /// Returns the total number of rows in this circle's group.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the original input row, passed through untouched.
    pub fn row(&self) -> &Row {
        &self.row
    }

    /// Returns the assigned center position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the assigned x-coordinate.
    pub fn x(&self) -> f64 {
        self.position.x()
    }

    /// Returns the assigned y-coordinate.
    pub fn y(&self) -> f64 {
        self.position.y()
    }
}

/// The closing summary for one group: label and gridline placement.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    group_label: Value,
    group_sublabel: String,
    group_count: usize,
    label_x: f64,
    label_y: f64,
    gridline_x: f64,
}

impl GroupSummary {
    /// Returns the group identifier.
    pub fn group_label(&self) -> &Value {
        &self.group_label
    }

    /// Returns the configured display label for the group.
    pub fn group_sublabel(&self) -> &str {
        &self.group_sublabel
    }

    /// Returns the number of rows in the group.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// The x-coordinate of the group label: the arithmetic mean of the
    /// distinct x-values used by the group's columns.
    pub fn label_x(&self) -> f64 {
        self.label_x
    }

    /// The y-coordinate of the group label row, constant across groups.
    pub fn label_y(&self) -> f64 {
        self.label_y
    }

    /// The x-coordinate of the vertical reference line closing the group:
    /// the group's maximum x plus the group margin.
    pub fn gridline_x(&self) -> f64 {
        self.gridline_x
    }
}

/// Distinct x- and y-values used so far within the current group.
///
/// Owned by the engine for the lifetime of one group's pass and discarded
/// once the group's summary is emitted.
#[derive(Debug, Default)]
struct PointHistory {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PointHistory {
    fn record(&mut self, point: Point) {
        if !self.xs.contains(&point.x()) {
            self.xs.push(point.x());
        }
        if !self.ys.contains(&point.y()) {
            self.ys.push(point.y());
        }
    }

    fn mean_x(&self) -> f64 {
        self.xs.iter().sum::<f64>() / self.xs.len() as f64
    }

    fn max_x(&self) -> f64 {
        self.xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// The circle layout engine.
///
/// # Examples
///
/// ```
/// # use dotgrid::config::LayoutConfig;
/// # use dotgrid::layout::{CircleLayout, LayoutItem};
/// # use dotgrid_core::frame::{Frame, Value};
/// # use dotgrid_core::style::StyleMap;
/// let config = LayoutConfig::default();
/// let styles = StyleMap::from_entries([("Dem", "blue", 1.0, "Democrat")]).unwrap();
///
/// let mut frame = Frame::new(["party", "chance"]).unwrap();
/// frame.push_row(vec![Value::from("Dem"), Value::from(0.9)]).unwrap();
///
/// let engine = CircleLayout::new(&config, &styles);
/// let items = engine.generate(&frame, "party", &["chance"]).unwrap();
/// assert_eq!(items.len(), 2); // one circle, one summary
/// assert!(matches!(items[1], LayoutItem::Label(_)));
/// ```
pub struct CircleLayout<'a> {
    config: &'a LayoutConfig,
    styles: &'a StyleMap,
}

impl<'a> CircleLayout<'a> {
    /// Creates an engine over a validated configuration and style map.
    pub fn new(config: &'a LayoutConfig, styles: &'a StyleMap) -> Self {
        Self { config, styles }
    }

    /// Generates the full placement/summary stream for the frame.
    ///
    /// The group column and every order column are checked before any item
    /// is produced; a missing column fails the whole invocation. A group
    /// present in the data but absent from the style map fails at the point
    /// its summary would be emitted.
    pub fn generate(
        &self,
        frame: &Frame,
        group: &str,
        order: &[&str],
    ) -> Result<Vec<LayoutItem>, LayoutError> {
        self.validate_schema(frame, group, order)?;

        let order_indices: Vec<usize> = order
            .iter()
            .map(|column| frame.column_index(column))
            .collect::<Result<_, _>>()?;

        debug!(group, rows = frame.len(); "Generating circle layout");

        let circle_margin = self.config.circle_margin();
        let group_margin = self.config.group_margin();
        let capacity = self.config.circles_per_column();

        let mut items = Vec::with_capacity(frame.len());
        let mut x = self.config.x_init();
        let mut y = self.config.y_init();
        let mut first_group = true;

        for (key, rows) in frame.group_by(group)? {
            // Shift x by the group margin for each group after the first.
            if !first_group {
                x += group_margin;
            }
            first_group = false;

            let ordered = Frame::sorted_descending(&rows, &order_indices);
            let count = ordered.len();
            let mut history = PointHistory::default();

            for (i, row) in ordered.into_iter().enumerate() {
                if i % capacity == 0 {
                    // A new column starts: the group margin before the
                    // group's first column, the circle margin on every wrap
                    // within the group.
                    x += if i == 0 { group_margin } else { circle_margin };
                    y = self.config.y_init();
                } else {
                    y += circle_margin;
                }

                let position = Point::new(x, y);
                history.record(position);
                trace!(group = key.to_string(), i, x, y; "Placed circle");

                items.push(LayoutItem::Circle(CirclePlacement {
                    group: key.clone(),
                    count,
                    row: row.clone(),
                    position,
                }));

                if i + 1 == count {
                    let style = self
                        .styles
                        .get(&key.to_string())
                        .ok_or_else(|| LayoutError::MissingStyle(key.to_string()))?;

                    items.push(LayoutItem::Label(GroupSummary {
                        group_label: key.clone(),
                        group_sublabel: style.label().to_string(),
                        group_count: count,
                        label_x: history.mean_x(),
                        label_y: self.config.label_row_y(),
                        gridline_x: history.max_x() + group_margin,
                    }));
                }
            }
        }

        debug!(items = items.len(); "Circle layout complete");
        Ok(items)
    }

    fn validate_schema(&self, frame: &Frame, group: &str, order: &[&str]) -> Result<(), LayoutError> {
        if !frame.has_column(group) {
            return Err(LayoutError::MissingGroupColumn(group.to_string()));
        }
        for column in order {
            if !frame.has_column(column) {
                return Err(LayoutError::MissingOrderColumn(column.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn styles() -> StyleMap {
        StyleMap::from_entries([
            ("Dem", "#00aef3", 0.8, "Democrat"),
            ("Rep", "#d30b0d", 0.8, "Republican"),
        ])
        .unwrap()
    }

    fn frame_with_group_sizes(sizes: &[(&str, usize)]) -> Frame {
        let mut frame = Frame::new(["party", "chance"]).unwrap();
        for (party, size) in sizes {
            for i in 0..*size {
                frame
                    .push_row(vec![Value::from(*party), Value::from(i as f64 / 10.0)])
                    .unwrap();
            }
        }
        frame
    }

    fn circles(items: &[LayoutItem]) -> Vec<&CirclePlacement> {
        items
            .iter()
            .filter_map(|item| match item {
                LayoutItem::Circle(c) => Some(c),
                LayoutItem::Label(_) => None,
            })
            .collect()
    }

    fn summaries(items: &[LayoutItem]) -> Vec<&GroupSummary> {
        items
            .iter()
            .filter_map(|item| match item {
                LayoutItem::Label(s) => Some(s),
                LayoutItem::Circle(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_missing_group_column_fails_fast() {
        let config = LayoutConfig::default();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 2)]);

        let engine = CircleLayout::new(&config, &styles);
        let result = engine.generate(&frame, "office", &["chance"]);
        assert!(matches!(result, Err(LayoutError::MissingGroupColumn(_))));
    }

    #[test]
    fn test_missing_order_column_fails_fast() {
        let config = LayoutConfig::default();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 2)]);

        let engine = CircleLayout::new(&config, &styles);
        let result = engine.generate(&frame, "party", &["votes"]);
        assert!(matches!(result, Err(LayoutError::MissingOrderColumn(_))));
    }

    #[test]
    fn test_missing_style_fails_at_group_close() {
        let config = LayoutConfig::default();
        let styles = StyleMap::from_entries([("Dem", "blue", 1.0, "Democrat")]).unwrap();
        let frame = frame_with_group_sizes(&[("Dem", 2), ("Rep", 2)]);

        let engine = CircleLayout::new(&config, &styles);
        let result = engine.generate(&frame, "party", &["chance"]);
        match result {
            Err(LayoutError::MissingStyle(group)) => assert_eq!(group, "Rep"),
            other => panic!("expected MissingStyle, got {other:?}"),
        }
    }

    #[test]
    fn test_worked_example_single_group() {
        // radius = 0.2 -> pad = 0.4, group_margin = 0.8, circle_margin = 0.6
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 10).unwrap();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 3)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();
        assert_eq!(items.len(), 4);

        let circles = circles(&items);
        let positions: Vec<(f64, f64)> = circles.iter().map(|c| (c.x(), c.y())).collect();
        // The group margin applies before the first circle of every group,
        // including the first group.
        assert_eq!(positions, vec![(0.8, 1.0), (0.8, 1.6), (0.8, 2.2)]);

        let summary = summaries(&items)[0];
        assert!(approx_eq!(f64, summary.label_x(), 0.8));
        assert!(approx_eq!(f64, summary.gridline_x(), 1.6));
        assert!(approx_eq!(f64, summary.label_y(), 7.0));
        assert_eq!(summary.group_count(), 3);
        assert_eq!(summary.group_sublabel(), "Democrat");
    }

    #[test]
    fn test_column_wrap_spans() {
        // circles_per_column = 3 and a group of 7 records spans ceil(7/3) = 3
        // columns, with the last column holding exactly 1 record.
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 3).unwrap();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 7)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();
        let circles = circles(&items);

        let mut distinct_xs: Vec<f64> = Vec::new();
        for circle in &circles {
            if !distinct_xs.contains(&circle.x()) {
                distinct_xs.push(circle.x());
            }
        }
        assert_eq!(distinct_xs.len(), 3);

        let last_column_count = circles
            .iter()
            .filter(|c| c.x() == *distinct_xs.last().unwrap())
            .count();
        assert_eq!(last_column_count, 1);

        // A new column resets y to y_init.
        assert_eq!(circles[3].y(), 1.0);
        assert_eq!(circles[6].y(), 1.0);
    }

    #[test]
    fn test_x_monotonically_non_decreasing() {
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 3).unwrap();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 7), ("Rep", 5)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();

        let mut last_x = f64::NEG_INFINITY;
        for circle in circles(&items) {
            assert!(circle.x() >= last_x);
            last_x = circle.x();
        }
    }

    #[test]
    fn test_column_y_stride() {
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 4).unwrap();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 4)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();

        let circles = circles(&items);
        for pair in circles.windows(2) {
            assert!(approx_eq!(f64, pair[1].y() - pair[0].y(), 0.6));
        }
    }

    #[test]
    fn test_one_summary_per_group_immediately_after_last_circle() {
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 3).unwrap();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 4), ("Rep", 2)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();

        // Dem: 4 circles then a label; Rep: 2 circles then a label.
        assert_eq!(items.len(), 8);
        assert!(matches!(items[4], LayoutItem::Label(_)));
        assert!(matches!(items[7], LayoutItem::Label(_)));
        assert_eq!(summaries(&items).len(), 2);

        for (i, item) in items.iter().enumerate() {
            if let LayoutItem::Label(summary) = item {
                match &items[i - 1] {
                    LayoutItem::Circle(circle) => {
                        assert_eq!(circle.group(), summary.group_label());
                    }
                    LayoutItem::Label(_) => panic!("summary not preceded by its group's circle"),
                }
            }
        }
    }

    #[test]
    fn test_groups_visited_in_first_occurrence_order() {
        let config = LayoutConfig::default();
        let styles = styles();

        // Rep appears first even though Dem sorts before it.
        let frame = frame_with_group_sizes(&[("Rep", 1), ("Dem", 1)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();
        let labels: Vec<String> = summaries(&items)
            .iter()
            .map(|s| s.group_label().to_string())
            .collect();
        assert_eq!(labels, vec!["Rep", "Dem"]);
    }

    #[test]
    fn test_rows_ordered_descending_within_group() {
        let config = LayoutConfig::default();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 5)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();

        let chance_index = frame.column_index("chance").unwrap();
        let chances: Vec<f64> = circles(&items)
            .iter()
            .map(|c| c.row().get(chance_index).unwrap().as_number().unwrap())
            .collect();
        let mut expected = chances.clone();
        expected.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(chances, expected);
    }

    #[test]
    fn test_gridline_formula() {
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 3).unwrap();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 7), ("Rep", 2)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();

        let all_circles = circles(&items);
        for summary in summaries(&items) {
            let group_max_x = all_circles
                .iter()
                .filter(|c| c.group() == summary.group_label())
                .map(|c| c.x())
                .fold(f64::NEG_INFINITY, f64::max);
            assert!(approx_eq!(
                f64,
                summary.gridline_x(),
                group_max_x + config.group_margin()
            ));
        }
    }

    #[test]
    fn test_label_x_is_mean_of_distinct_xs() {
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 3).unwrap();
        let styles = styles();
        // 7 rows over 3 columns: the mean is over 3 distinct x's, not 7.
        let frame = frame_with_group_sizes(&[("Dem", 7)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();

        let mut distinct_xs: Vec<f64> = Vec::new();
        for circle in circles(&items) {
            if !distinct_xs.contains(&circle.x()) {
                distinct_xs.push(circle.x());
            }
        }
        let expected = distinct_xs.iter().sum::<f64>() / distinct_xs.len() as f64;
        assert!(approx_eq!(f64, summaries(&items)[0].label_x(), expected));
    }

    #[test]
    fn test_count_matches_group_size() {
        let config = LayoutConfig::default();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 3), ("Rep", 6)]);

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();

        for circle in circles(&items) {
            let expected = match circle.group().to_string().as_str() {
                "Dem" => 3,
                "Rep" => 6,
                other => panic!("unexpected group {other}"),
            };
            assert_eq!(circle.count(), expected);
        }
    }

    #[test]
    fn test_empty_frame_yields_empty_stream() {
        let config = LayoutConfig::default();
        let styles = styles();
        let frame = Frame::new(["party", "chance"]).unwrap();

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_deterministic_across_invocations() {
        let config = LayoutConfig::new(0.2, 0.0, 1.0, 3).unwrap();
        let styles = styles();
        let frame = frame_with_group_sizes(&[("Dem", 7), ("Rep", 5)]);

        let engine = CircleLayout::new(&config, &styles);
        let first = engine.generate(&frame, "party", &["chance"]).unwrap();
        let second = engine.generate(&frame, "party", &["chance"]).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            match (a, b) {
                (LayoutItem::Circle(a), LayoutItem::Circle(b)) => {
                    assert_eq!(a.position(), b.position());
                    assert_eq!(a.group(), b.group());
                }
                (LayoutItem::Label(a), LayoutItem::Label(b)) => {
                    assert_eq!(a.label_x(), b.label_x());
                    assert_eq!(a.gridline_x(), b.gridline_x());
                }
                _ => panic!("streams disagree on item kind"),
            }
        }
    }

    #[test]
    fn test_multi_column_order_ties_keep_input_order() {
        let config = LayoutConfig::default();
        let styles = styles();

        let mut frame = Frame::new(["party", "chance", "name"]).unwrap();
        for name in ["first", "second", "third"] {
            frame
                .push_row(vec![
                    Value::from("Dem"),
                    Value::from(0.5),
                    Value::from(name),
                ])
                .unwrap();
        }

        let engine = CircleLayout::new(&config, &styles);
        let items = engine.generate(&frame, "party", &["chance"]).unwrap();
        let names: Vec<&str> = circles(&items)
            .iter()
            .map(|c| c.row().get(2).unwrap().as_text().unwrap())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }
}
