//! Chart Series Module
//! Plain, serializable records handed to whatever renders the charts.

use crate::data::Table;
use crate::stats::{GroupAverages, Histogram};
use serde::Serialize;

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A single best/worst-group result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub label: String,
    pub value: f64,
}

impl Finding {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: round2(value),
        }
    }

    pub fn from_pair(pair: Option<(&str, f64)>) -> Option<Self> {
        pair.map(|(label, value)| Self::new(label, value))
    }
}

/// One named series of values aligned to the chart labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
}

/// Kind of chart a series is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// Labelled chart data for bar and line charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub kind: ChartKind,
    pub y_label: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    pub fn new(title: &str, kind: ChartKind, y_label: &str, labels: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            kind,
            y_label: y_label.to_string(),
            labels,
            datasets: Vec::new(),
        }
    }

    pub fn with_dataset(mut self, label: &str, values: Vec<f64>) -> Self {
        self.datasets.push(Dataset {
            label: label.to_string(),
            values,
        });
        self
    }

    /// Single-series chart from grouped averages, in group order.
    pub fn from_groups(title: &str, kind: ChartKind, y_label: &str, groups: &GroupAverages) -> Self {
        Self::new(title, kind, y_label, groups.labels()).with_dataset(y_label, groups.values())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// Labelled points for a scatter chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
}

/// Distribution of one column, labelled by bin midpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramChart {
    pub column: String,
    pub labels: Vec<String>,
    pub histogram: Histogram,
}

impl HistogramChart {
    pub fn new(column: &str, histogram: Histogram) -> Self {
        let labels = histogram
            .bins
            .iter()
            .map(|b| format!("{:.2}", b.midpoint))
            .collect();
        Self {
            column: column.to_string(),
            labels,
            histogram,
        }
    }
}

/// Header plus the first rows of a table, every cell stringified as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    pub fn from_table(table: &Table, max_rows: usize) -> Self {
        Self {
            headers: table.columns().to_vec(),
            rows: table
                .rows()
                .iter()
                .take(max_rows)
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }
}
