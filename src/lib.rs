//! Supply Chain Analyzer - CSV Supply-Chain Statistics
//!
//! Parses a supply-chain CSV, derives lead time, delay and order month for
//! each row, and computes grouped averages, variability, correlation and
//! distributions as plain records ready for charting.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
pub mod stats;

pub use analysis::{AnalysisReport, SupplyChainAnalyzer};
pub use config::{AnalysisConfig, FieldMap, KeyFilter};
pub use data::{DataLoader, Table, Value};
