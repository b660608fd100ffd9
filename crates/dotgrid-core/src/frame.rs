//! A small ordered tabular container.
//!
//! The layout engine consumes a [`Frame`]: named columns over rows of
//! [`Value`] cells. The frame supports exactly what layout needs from a
//! tabular source:
//!
//! - column existence checks ([`Frame::has_column`])
//! - grouping by a named column, preserving first-occurrence group order
//!   ([`Frame::group_by`])
//! - stable descending multi-column ordering ([`Frame::sorted_descending`])
//! - row count ([`Frame::len`])
//!
//! Rows are opaque to layout beyond the group and order columns; placements
//! carry them through untouched for downstream consumers.

use std::{cmp::Ordering, fmt};

use indexmap::IndexMap;
use thiserror::Error;

/// Errors raised while constructing or querying a [`Frame`].
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),

    #[error("row has {found} values, frame has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    #[error("frame does not contain column `{0}`")]
    UnknownColumn(String),
}

/// A single cell value.
///
/// Cells are typed loosely the way flat-file data arrives: text, numbers,
/// booleans, or missing. `Value` provides the total ordering and hashing the
/// frame needs for sorting and grouping; numbers order by IEEE total order,
/// so `NaN` cells sort deterministically instead of poisoning a sort.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Returns true for the `Null` variant.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the contained number, if this is a `Number` cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained text, if this is a `Text` cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.variant_rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => n.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One row of a [`Frame`], cells in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<Value>);

impl Row {
    /// Returns the cell at the given column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Returns all cells in column order.
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

/// An ordered tabular collection with named columns.
///
/// # Examples
///
/// ```
/// # use dotgrid_core::frame::{Frame, Value};
/// let mut frame = Frame::new(["party", "chance"]).unwrap();
/// frame.push_row(vec![Value::from("Dem"), Value::from(0.9)]).unwrap();
/// frame.push_row(vec![Value::from("Rep"), Value::from(0.4)]).unwrap();
///
/// assert_eq!(frame.len(), 2);
/// assert!(frame.has_column("party"));
/// assert!(!frame.has_column("office"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Frame {
    /// Creates an empty frame with the given column names.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::DuplicateColumn`] when a column name repeats.
    pub fn new<I, S>(columns: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for column in columns {
            let column = column.into();
            if names.contains(&column) {
                return Err(FrameError::DuplicateColumn(column));
            }
            names.push(column);
        }
        Ok(Self {
            columns: names,
            rows: Vec::new(),
        })
    }

    /// Appends a row, checking that it matches the column count.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<(), FrameError> {
        if values.len() != self.columns.len() {
            return Err(FrameError::RowWidth {
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        self.rows.push(Row(values));
        Ok(())
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true if the frame has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Returns the index of the named column.
    pub fn column_index(&self, name: &str) -> Result<usize, FrameError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_string()))
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns all rows in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Groups rows by the named column, preserving the order in which each
    /// group key first appears (no sorting of keys).
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownColumn`] when the column does not exist.
    pub fn group_by(&self, column: &str) -> Result<Vec<(Value, Vec<&Row>)>, FrameError> {
        let index = self.column_index(column)?;
        let mut groups: IndexMap<Value, Vec<&Row>> = IndexMap::new();
        for row in &self.rows {
            // push_row guarantees every row is as wide as the header
            let key = row.get(index).cloned().unwrap_or(Value::Null);
            groups.entry(key).or_default().push(row);
        }
        Ok(groups.into_iter().collect())
    }

    /// Sorts a slice of rows in descending order over the given column
    /// indices, lexicographically across columns. The sort is stable, so
    /// ties keep their original relative order.
    pub fn sorted_descending<'a>(rows: &[&'a Row], order_indices: &[usize]) -> Vec<&'a Row> {
        let mut sorted: Vec<&Row> = rows.to_vec();
        sorted.sort_by(|a, b| {
            for &index in order_indices {
                let left = a.get(index).unwrap_or(&Value::Null);
                let right = b.get(index).unwrap_or(&Value::Null);
                // reversed comparison: descending
                match right.cmp(left) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            Ordering::Equal
        });
        sorted
    }
}
