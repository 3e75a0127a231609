//! Data Processor Module
//! Derives lead time, delay duration and order month for every row.

use super::value::{Table, Value};
use crate::config::{FieldMap, DELAY_DURATION, LEAD_TIME, MONTH};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Fixed month names so grouping keys never depend on locale.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Handles row enrichment.
pub struct DataProcessor;

impl DataProcessor {
    /// Return a copy of `table` with `LeadTime`, `DelayDuration` and `Month`
    /// columns. Row count and order are preserved. Unparseable dates yield
    /// `NaN` day counts and a null month.
    pub fn enrich(table: &Table, fields: &FieldMap) -> Table {
        let mut lead_times = Vec::with_capacity(table.len());
        let mut delays = Vec::with_capacity(table.len());
        let mut months = Vec::with_capacity(table.len());
        let mut invalid_rows = 0usize;

        for row in 0..table.len() {
            let order = Self::parse_date(table.get(row, &fields.order_date));
            let expected = Self::parse_date(table.get(row, &fields.expected_delivery_date));
            let actual = Self::parse_date(table.get(row, &fields.actual_delivery_date));

            if order.is_none() || expected.is_none() || actual.is_none() {
                invalid_rows += 1;
            }

            lead_times.push(Value::Number(Self::day_difference(order, actual)));
            delays.push(Value::Number(Self::day_difference(expected, actual)));
            months.push(
                order
                    .map(|d| Value::Text(Self::month_name(d.month()).to_string()))
                    .unwrap_or(Value::Null),
            );
        }

        if invalid_rows > 0 {
            log::warn!(
                "{} of {} rows have missing or unparseable dates",
                invalid_rows,
                table.len()
            );
        }

        let mut enriched = table.clone();
        enriched.set_column(LEAD_TIME, lead_times);
        enriched.set_column(DELAY_DURATION, delays);
        enriched.set_column(MONTH, months);
        enriched
    }

    /// Whole days from `from` to `to`, rounded up. `NaN` when either is missing.
    pub fn day_difference(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> f64 {
        match (from, to) {
            (Some(from), Some(to)) => {
                let ms = (to - from).num_milliseconds() as f64;
                let days = (ms / MS_PER_DAY).ceil();
                // ceil(-0.5) is -0
                if days == 0.0 {
                    0.0
                } else {
                    days
                }
            }
            _ => f64::NAN,
        }
    }

    /// English month name for a 1-based month number.
    pub fn month_name(month: u32) -> &'static str {
        MONTH_NAMES[(month.clamp(1, 12) - 1) as usize]
    }

    /// Interpret a cell as a UTC timestamp.
    pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
        match value {
            Value::Date(d) => Some(*d),
            Value::Text(s) => Self::parse_date_str(s),
            _ => None,
        }
    }

    pub fn parse_date_str(text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_utc());
        }
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<[&str; 3]>) -> Table {
        Table::from_rows(
            ["Order_Date", "Expected_Delivery_Date", "Actual_Delivery_Date"],
            rows.into_iter()
                .map(|r| r.iter().map(|s| Value::from(*s)).collect::<Vec<Value>>())
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn derives_lead_time_delay_and_month() {
        let enriched = DataProcessor::enrich(
            &table(vec![["2024-01-01", "2024-01-05", "2024-01-07"]]),
            &FieldMap::snake_case(),
        );
        assert_eq!(enriched.get(0, LEAD_TIME), &Value::Number(6.0));
        assert_eq!(enriched.get(0, DELAY_DURATION), &Value::Number(2.0));
        assert_eq!(enriched.get(0, MONTH), &Value::from("January"));
        assert_eq!(enriched.columns().len(), 6);
    }

    #[test]
    fn early_delivery_gives_negative_delay() {
        let enriched = DataProcessor::enrich(
            &table(vec![["2024-03-01", "2024-03-10", "2024-03-07"]]),
            &FieldMap::snake_case(),
        );
        assert_eq!(enriched.get(0, DELAY_DURATION), &Value::Number(-3.0));
        assert_eq!(enriched.get(0, MONTH), &Value::from("March"));
    }

    #[test]
    fn partial_days_round_up() {
        let from = DataProcessor::parse_date_str("2024-01-01T00:00:00");
        let to = DataProcessor::parse_date_str("2024-01-02T02:24:00");
        assert_eq!(DataProcessor::day_difference(from, to), 2.0);
        assert_eq!(DataProcessor::day_difference(from, from), 0.0);
        // 12 hours early rounds toward zero
        let early = DataProcessor::parse_date_str("2023-12-31 12:00");
        assert_eq!(DataProcessor::day_difference(from, early), 0.0);
    }

    #[test]
    fn unparseable_dates_fail_soft() {
        let enriched = DataProcessor::enrich(
            &table(vec![["not a date", "2024-01-05", "2024-01-07"], ["2024-05-02", "", "2024-05-04"]]),
            &FieldMap::snake_case(),
        );
        assert!(enriched.get(0, LEAD_TIME).as_f64().unwrap().is_nan());
        assert_eq!(enriched.get(0, DELAY_DURATION), &Value::Number(2.0));
        assert_eq!(enriched.get(0, MONTH), &Value::Null);
        assert_eq!(enriched.get(1, LEAD_TIME), &Value::Number(2.0));
        assert!(enriched.get(1, DELAY_DURATION).as_f64().unwrap().is_nan());
        assert_eq!(enriched.get(1, MONTH), &Value::from("May"));
    }

    #[test]
    fn camel_case_fields_and_alternate_formats() {
        let raw = Table::from_rows(
            ["OrderDate", "ExpectedDeliveryDate", "ActualDeliveryDate"],
            vec![vec![
                Value::from("12/30/2023"),
                Value::from("2024/01/02"),
                Value::from("2024-01-03T00:00:00Z"),
            ]],
        );
        let enriched = DataProcessor::enrich(&raw, &FieldMap::camel_case());
        assert_eq!(enriched.get(0, LEAD_TIME), &Value::Number(4.0));
        assert_eq!(enriched.get(0, DELAY_DURATION), &Value::Number(1.0));
        assert_eq!(enriched.get(0, MONTH), &Value::from("December"));
    }

    #[test]
    fn enrichment_is_idempotent() {
        let fields = FieldMap::snake_case();
        let once = DataProcessor::enrich(&table(vec![["2024-01-01", "2024-01-05", "2024-01-07"]]), &fields);
        let twice = DataProcessor::enrich(&once, &fields);
        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_row_order() {
        let enriched = DataProcessor::enrich(
            &table(vec![
                ["2024-02-01", "2024-02-02", "2024-02-03"],
                ["2024-07-01", "2024-07-02", "2024-07-03"],
            ]),
            &FieldMap::snake_case(),
        );
        assert_eq!(enriched.get(0, MONTH), &Value::from("February"));
        assert_eq!(enriched.get(1, MONTH), &Value::from("July"));
    }
}
