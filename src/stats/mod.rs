//! Stats module - Aggregation, variability, correlation and binning

mod calculator;
mod correlation;
mod histogram;

pub use calculator::{
    CategoryCount, ColumnKind, ColumnSummary, GroupAccumulator, GroupAverages, NumericSummary,
    StatsCalculator,
};
pub use correlation::{correlation_matrix, pearson, pearson_pairs, CorrelationMatrix};
pub use histogram::{default_bin_count, histogram, Histogram, HistogramBin, DEFAULT_MAX_BINS};
