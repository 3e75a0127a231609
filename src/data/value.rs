//! Table Model Module
//! Dynamically-typed cell values and the in-memory row table.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A dynamically-typed cell value as produced by CSV type inference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose truthiness: null, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Date(_) => true,
        }
    }

    /// Numeric view of the cell. Only `Number` cells qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view restricted to finite values.
    pub fn as_finite(&self) -> Option<f64> {
        self.as_f64().filter(|n| n.is_finite())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }
}

/// Format a float the way a loosely-typed runtime prints it:
/// `5` rather than `5.0`, `NaN`, `Infinity`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        // Collapse -0 to 0
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

static NULL: Value = Value::Null;

/// Ordered sequence of records sharing one header. Row order is file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows: Vec::new(),
        }
    }

    /// Build a table from a header and row values. Short rows are padded with
    /// nulls and long rows truncated to the header width.
    pub fn from_rows<C, R>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        let mut table = Self::new(columns.into_iter().map(Into::into).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Cell at (row, column). Unknown columns and rows read as null.
    pub fn get(&self, row: usize, column: &str) -> &Value {
        match (self.rows.get(row), self.column_index(column)) {
            (Some(values), Some(idx)) => &values[idx],
            _ => &NULL,
        }
    }

    /// Iterate a column top to bottom; yields nulls for an unknown column.
    pub fn column<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let idx = self.column_index(column);
        self.rows.iter().map(move |row| match idx {
            Some(i) => &row[i],
            None => &NULL,
        })
    }

    /// Finite numeric values of a column, skipping everything else.
    pub fn finite_values(&self, column: &str) -> Vec<f64> {
        self.column(column).filter_map(Value::as_finite).collect()
    }

    /// Add a derived column, or overwrite it when the name already exists.
    /// `values` must hold one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.index.insert(name.to_string(), self.columns.len());
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }
}
