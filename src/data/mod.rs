//! Data module - CSV loading, table model and row enrichment

mod loader;
mod processor;
mod value;

pub use loader::{DataLoader, LoaderError};
pub use processor::{DataProcessor, MONTH_NAMES};
pub use value::{format_number, Table, Value};
