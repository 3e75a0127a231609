//! CSV Data Loader Module
//! Handles CSV file loading with Polars and conversion into a row table.

use super::value::{Table, Value};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Holds the current table. Loading a new file discards the previous one.
pub struct DataLoader {
    table: Option<Table>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { table: None }
    }

    /// Load a CSV file (first row = headers) using Polars type inference.
    /// Date-like columns are parsed into `Value::Date` cells.
    pub fn load_csv(&mut self, file_path: impl AsRef<Path>) -> Result<&Table, LoaderError> {
        let path = file_path.as_ref();
        self.table = None;

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .with_try_parse_dates(true)
            .finish()?
            .collect()?;

        let table = Self::dataframe_to_table(&df)?;
        log::info!(
            "Loaded {} rows, {} columns from {}",
            table.len(),
            table.columns().len(),
            path.display()
        );
        if table.is_empty() {
            return Err(LoaderError::NoData);
        }

        self.table = Some(table);
        self.table.as_ref().ok_or(LoaderError::NoData)
    }

    /// Convert a DataFrame into row records, preserving column and row order.
    pub fn dataframe_to_table(df: &DataFrame) -> Result<Table, LoaderError> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows: Vec<Vec<Value>> = (0..df.height())
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();

        for column in df.get_columns() {
            for (i, row) in rows.iter_mut().enumerate() {
                row.push(Self::convert_value(column.get(i)?));
            }
        }

        Ok(Table::from_rows(columns, rows))
    }

    /// Map an inferred Polars cell onto the table's value model.
    fn convert_value(value: AnyValue<'_>) -> Value {
        match value {
            AnyValue::Null => Value::Null,
            AnyValue::Boolean(b) => Value::Bool(b),
            AnyValue::String(s) => Value::Text(s.to_string()),
            AnyValue::StringOwned(s) => Value::Text(s.to_string()),
            AnyValue::Date(days) => {
                Self::date_value(DateTime::from_timestamp(i64::from(days) * 86_400, 0))
            }
            AnyValue::Datetime(v, unit, _) => {
                Self::date_value(match unit {
                    TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
                    TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
                    TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
                })
            }
            other => other
                .extract::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|| Value::Text(other.to_string().trim_matches('"').to_string())),
        }
    }

    fn date_value(timestamp: Option<DateTime<Utc>>) -> Value {
        timestamp
            .map(|d| Value::Date(d.naive_utc()))
            .unwrap_or(Value::Null)
    }

    /// Get the number of rows in the table.
    pub fn get_row_count(&self) -> usize {
        self.table.as_ref().map(Table::len).unwrap_or(0)
    }

    /// Get a reference to the loaded table.
    pub fn get_table(&self) -> Option<&Table> {
        self.table.as_ref()
    }
}
