//! Configuration Module
//! Source column mapping and analysis limits, loadable from JSON.

use crate::data::Value;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Derived column names added by the enricher.
pub const LEAD_TIME: &str = "LeadTime";
pub const DELAY_DURATION: &str = "DelayDuration";
pub const MONTH: &str = "Month";

/// Names of the source columns in the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub order_date: String,
    pub expected_delivery_date: String,
    pub actual_delivery_date: String,
    pub supplier: String,
    pub transportation_mode: String,
    pub product_category: String,
    pub disruption_type: String,
    pub customer_demand: String,
    pub order_quantity: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::snake_case()
    }
}

impl FieldMap {
    /// `Order_Date`, `Expected_Delivery_Date`, ...
    pub fn snake_case() -> Self {
        Self {
            order_date: "Order_Date".into(),
            expected_delivery_date: "Expected_Delivery_Date".into(),
            actual_delivery_date: "Actual_Delivery_Date".into(),
            supplier: "Supplier".into(),
            transportation_mode: "Transportation_Mode".into(),
            product_category: "Product_Category".into(),
            disruption_type: "Disruption_Type".into(),
            customer_demand: "Customer_Demand".into(),
            order_quantity: "Order_Quantity".into(),
        }
    }

    /// `OrderDate`, `ExpectedDeliveryDate`, ...
    pub fn camel_case() -> Self {
        Self {
            order_date: "OrderDate".into(),
            expected_delivery_date: "ExpectedDeliveryDate".into(),
            actual_delivery_date: "ActualDeliveryDate".into(),
            supplier: "Supplier".into(),
            transportation_mode: "TransportationMode".into(),
            product_category: "ProductCategory".into(),
            disruption_type: "DisruptionType".into(),
            customer_demand: "CustomerDemand".into(),
            order_quantity: "OrderQuantity".into(),
        }
    }

    pub fn names(&self) -> [&str; 9] {
        [
            &self.order_date,
            &self.expected_delivery_date,
            &self.actual_delivery_date,
            &self.supplier,
            &self.transportation_mode,
            &self.product_category,
            &self.disruption_type,
            &self.customer_demand,
            &self.order_quantity,
        ]
    }

    /// Number of mapped names present in `columns`.
    pub fn matches(&self, columns: &[String]) -> usize {
        self.names()
            .iter()
            .filter(|name| columns.iter().any(|c| c == *name))
            .count()
    }

    /// Pick the built-in preset that best fits the header. Snake case wins ties.
    pub fn detect(columns: &[String]) -> Self {
        let snake = Self::snake_case();
        let camel = Self::camel_case();
        if camel.matches(columns) > snake.matches(columns) {
            camel
        } else {
            snake
        }
    }

    /// Mapped names that do not appear in `columns`.
    pub fn missing<'a>(&'a self, columns: &[String]) -> Vec<&'a str> {
        self.names()
            .into_iter()
            .filter(|name| !columns.iter().any(|c| c == name))
            .collect()
    }
}

/// How group keys and sample values are screened before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFilter {
    /// Drop falsy values: null, `0`, `NaN`, `""`, `false`.
    #[default]
    Truthy,
    /// Drop only null and non-finite values.
    Present,
}

impl KeyFilter {
    /// Whether a group key or sample value takes part in an aggregate.
    pub fn admits(self, value: &Value) -> bool {
        match self {
            KeyFilter::Truthy => value.is_truthy(),
            KeyFilter::Present => match value {
                Value::Null => false,
                Value::Number(n) => n.is_finite(),
                _ => true,
            },
        }
    }

    /// Numeric sample value, if admitted and finite.
    pub fn sample(self, value: &Value) -> Option<f64> {
        value.as_finite().filter(|_| self.admits(value))
    }
}

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Explicit column mapping; detected from the header when absent.
    pub fields: Option<FieldMap>,
    pub key_filter: KeyFilter,
    pub max_histogram_bins: usize,
    pub preview_rows: usize,
    pub top_categories: usize,
    pub max_correlation_columns: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fields: None,
            key_filter: KeyFilter::Truthy,
            max_histogram_bins: 20,
            preview_rows: 10,
            top_categories: 3,
            max_correlation_columns: 12,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Column mapping to use for `columns`.
    pub fn resolve_fields(&self, columns: &[String]) -> FieldMap {
        self.fields
            .clone()
            .unwrap_or_else(|| FieldMap::detect(columns))
    }
}
