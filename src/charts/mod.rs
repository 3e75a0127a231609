//! Charts module - Chart-ready result records

mod series;

pub use series::{
    round2, ChartData, ChartKind, Dataset, Finding, HistogramChart, ScatterData, ScatterPoint,
    TablePreview,
};
