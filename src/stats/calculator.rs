//! Statistics Calculator Module
//! Handles grouped averages, descriptive column summaries and variability.

use crate::config::KeyFilter;
use crate::data::{Table, Value};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::HashMap;

/// Per-group averages in first-occurrence order of each key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupAverages {
    entries: Vec<(String, f64)>,
}

impl GroupAverages {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    /// Group with the largest average. Ties keep the earliest group.
    pub fn highest(&self) -> Option<(&str, f64)> {
        self.iter().fold(None, |best, (k, v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((k, v)),
        })
    }

    /// Group with the smallest average. Ties keep the earliest group.
    pub fn lowest(&self) -> Option<(&str, f64)> {
        self.iter().fold(None, |best, (k, v)| match best {
            Some((_, b)) if v >= b => best,
            _ => Some((k, v)),
        })
    }
}

/// Running sum/count per key, remembering first-occurrence order.
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    order: Vec<String>,
    sums: HashMap<String, (f64, usize)>,
}

impl GroupAccumulator {
    pub fn add(&mut self, key: String, value: f64) {
        if !self.sums.contains_key(&key) {
            self.order.push(key.clone());
        }
        let entry = self.sums.entry(key).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    pub fn averages(self) -> GroupAverages {
        let GroupAccumulator { order, sums } = self;
        let entries = order
            .into_iter()
            .filter_map(|key| {
                let (sum, count) = sums.get(&key).copied()?;
                Some((key, sum / count as f64))
            })
            .collect();
        GroupAverages { entries }
    }
}

/// Summary of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl Default for NumericSummary {
    fn default() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            median: f64::NAN,
        }
    }
}

/// Value and its frequency in a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric(NumericSummary),
    Categorical { top_categories: Vec<CategoryCount> },
}

/// Per-column descriptor used by the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Non-null values.
    pub count: usize,
    pub unique_values: usize,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl ColumnSummary {
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Numeric(_))
    }
}

/// Stateless statistics over the current table.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Average `value_field` per distinct `group_field`.
    ///
    /// Rows whose key fails `filter` are skipped, as are rows whose value is
    /// null, non-numeric or non-finite. A group with one sample yields that
    /// sample exactly.
    pub fn group_average(
        table: &Table,
        group_field: &str,
        value_field: &str,
        filter: KeyFilter,
    ) -> GroupAverages {
        let mut acc = GroupAccumulator::default();
        for (key, value) in table.column(group_field).zip(table.column(value_field)) {
            if !filter.admits(key) {
                continue;
            }
            if let Some(v) = value.as_finite() {
                acc.add(key.to_string(), v);
            }
        }
        acc.averages()
    }

    /// Compute min, max, mean and median of the finite entries of `values`.
    pub fn compute_numeric_summary(values: &[f64]) -> NumericSummary {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let n = sorted.len();
        if n == 0 {
            return NumericSummary::default();
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        NumericSummary {
            min: sorted[0],
            max: sorted[n - 1],
            mean: sorted.iter().sum::<f64>() / n as f64,
            median: Self::median_sorted(&sorted),
        }
    }

    /// Median of ascending-sorted values; `NaN` when empty.
    pub fn median_sorted(sorted: &[f64]) -> f64 {
        let n = sorted.len();
        if n == 0 {
            f64::NAN
        } else if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        }
    }

    pub fn median(values: &[f64]) -> f64 {
        Self::compute_numeric_summary(values).median
    }

    /// Describe one column. The column is numeric iff every non-null value is
    /// a number; otherwise its `top_n` most frequent values are reported,
    /// ties in first-seen order.
    pub fn describe_column(table: &Table, column: &str, top_n: usize) -> ColumnSummary {
        let present: Vec<&Value> = table.column(column).filter(|v| !v.is_null()).collect();

        let unique_values = present
            .iter()
            .map(|v| Self::identity_key(v))
            .collect::<std::collections::HashSet<_>>()
            .len();

        let kind = if present.iter().all(|v| v.is_number()) {
            let numbers: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
            ColumnKind::Numeric(Self::compute_numeric_summary(&numbers))
        } else {
            ColumnKind::Categorical {
                top_categories: Self::top_categories(&present, top_n),
            }
        };

        ColumnSummary {
            column: column.to_string(),
            count: present.len(),
            unique_values,
            kind,
        }
    }

    fn top_categories(values: &[&Value], top_n: usize) -> Vec<CategoryCount> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for value in values {
            let key = value.to_string();
            let count = counts.entry(key.clone()).or_insert(0);
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }

        let mut ranked: Vec<CategoryCount> = order
            .into_iter()
            .map(|value| {
                let frequency = counts.get(&value).copied().unwrap_or(0);
                CategoryCount { value, frequency }
            })
            .collect();
        // Stable: equal counts stay in first-seen order
        ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        ranked.truncate(top_n);
        ranked
    }

    /// Distinctness key: the number `1` and the text `"1"` differ.
    fn identity_key(value: &Value) -> (u8, String) {
        let tag = match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::Text(_) => 3,
            Value::Date(_) => 4,
        };
        (tag, value.to_string())
    }

    /// Population coefficient of variation, `std / mean`.
    ///
    /// Returns 0 for an empty sample. A zero mean gives a non-finite result,
    /// which consumers treat as undefined.
    pub fn coefficient_of_variation(sample: &[f64]) -> f64 {
        if sample.is_empty() {
            return 0.0;
        }
        let mean = sample.iter().mean();
        let std = sample.iter().population_std_dev();
        std / mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn grouped(rows: Vec<(Value, Value)>) -> Table {
        Table::from_rows(["group", "value"], rows.into_iter().map(|(g, v)| vec![g, v]))
    }

    #[test]
    fn single_group_average_is_plain_mean() {
        let table = grouped(vec![
            ("A".into(), 2.0.into()),
            ("A".into(), 4.0.into()),
            ("A".into(), 9.0.into()),
        ]);
        let avg = StatsCalculator::group_average(&table, "group", "value", KeyFilter::Truthy);
        assert_eq!(avg.len(), 1);
        assert!(close(avg.get("A").unwrap(), 5.0));
    }

    #[test]
    fn groups_keep_first_occurrence_order() {
        let table = grouped(vec![
            ("Sea".into(), 10.0.into()),
            ("Air".into(), 2.0.into()),
            ("Sea".into(), 20.0.into()),
            ("Road".into(), 5.0.into()),
        ]);
        let avg = StatsCalculator::group_average(&table, "group", "value", KeyFilter::Truthy);
        assert_eq!(avg.labels(), vec!["Sea", "Air", "Road"]);
        assert_eq!(avg.values(), vec![15.0, 2.0, 5.0]);
        assert_eq!(avg.highest(), Some(("Sea", 15.0)));
        assert_eq!(avg.lowest(), Some(("Air", 2.0)));
    }

    #[test]
    fn falsy_keys_and_missing_values_are_skipped() {
        let table = grouped(vec![
            ("".into(), 1.0.into()),
            (Value::Number(0.0), 1.0.into()),
            (Value::Null, 1.0.into()),
            ("A".into(), Value::Null),
            ("A".into(), Value::Number(f64::NAN)),
            ("A".into(), "n/a".into()),
            ("A".into(), 0.0.into()),
            ("A".into(), 3.0.into()),
        ]);
        let avg = StatsCalculator::group_average(&table, "group", "value", KeyFilter::Truthy);
        assert_eq!(avg.labels(), vec!["A"]);
        assert!(close(avg.get("A").unwrap(), 1.5));

        let present = StatsCalculator::group_average(&table, "group", "value", KeyFilter::Present);
        assert_eq!(present.labels(), vec!["", "0", "A"]);
    }

    #[test]
    fn ties_resolve_to_earliest_group() {
        let table = grouped(vec![("B".into(), 1.0.into()), ("A".into(), 1.0.into())]);
        let avg = StatsCalculator::group_average(&table, "group", "value", KeyFilter::Truthy);
        assert_eq!(avg.highest().unwrap().0, "B");
        assert_eq!(avg.lowest().unwrap().0, "B");
        assert!(GroupAverages::default().highest().is_none());
    }

    #[test]
    fn missing_columns_give_empty_result() {
        let table = grouped(vec![("A".into(), 1.0.into())]);
        assert!(StatsCalculator::group_average(&table, "nope", "value", KeyFilter::Truthy).is_empty());
        assert!(StatsCalculator::group_average(&table, "group", "nope", KeyFilter::Truthy).is_empty());
    }

    #[test]
    fn median_of_even_and_odd_samples() {
        assert!(close(StatsCalculator::median(&[1.0, 2.0, 3.0, 4.0]), 2.5));
        assert!(close(StatsCalculator::median(&[3.0, 1.0, 2.0]), 2.0));
        assert!(StatsCalculator::median(&[]).is_nan());
    }

    #[test]
    fn describes_numeric_column() {
        let table = Table::from_rows(
            ["q"],
            [4.0, 1.0, 3.0, 2.0].iter().map(|v| vec![Value::from(*v)]).chain([vec![Value::Null]]),
        );
        let summary = StatsCalculator::describe_column(&table, "q", 3);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.unique_values, 4);
        match summary.kind {
            ColumnKind::Numeric(s) => {
                assert_eq!(s.min, 1.0);
                assert_eq!(s.max, 4.0);
                assert!(close(s.mean, 2.5));
                assert!(close(s.median, 2.5));
            }
            other => panic!("expected numeric, got {other:?}"),
        }
    }

    #[test]
    fn describes_categorical_column_with_stable_ties() {
        let table = Table::from_rows(
            ["c"],
            ["1", "1", "2", "3", "3", "3"].iter().map(|v| vec![Value::from(*v)]),
        );
        let summary = StatsCalculator::describe_column(&table, "c", 3);
        assert_eq!(summary.count, 6);
        assert_eq!(summary.unique_values, 3);
        let ColumnKind::Categorical { top_categories } = summary.kind else {
            panic!("expected categorical");
        };
        let pairs: Vec<(&str, usize)> = top_categories
            .iter()
            .map(|c| (c.value.as_str(), c.frequency))
            .collect();
        assert_eq!(pairs, vec![("3", 3), ("1", 2), ("2", 1)]);
    }

    #[test]
    fn mixed_column_is_categorical_and_limited() {
        let table = Table::from_rows(
            ["m"],
            vec![
                vec![Value::from("x")],
                vec![Value::from(1.0)],
                vec![Value::from("y")],
                vec![Value::from("1")],
                vec![Value::from("z")],
            ],
        );
        let summary = StatsCalculator::describe_column(&table, "m", 2);
        assert!(!summary.is_numeric());
        // number 1 and text "1" are distinct values but share a label
        assert_eq!(summary.unique_values, 5);
        let ColumnKind::Categorical { top_categories } = summary.kind else {
            panic!("expected categorical");
        };
        assert_eq!(top_categories.len(), 2);
        assert_eq!(top_categories[0].value, "1");
        assert_eq!(top_categories[0].frequency, 2);
        assert_eq!(top_categories[1].value, "x");
    }

    #[test]
    fn coefficient_of_variation_edge_cases() {
        assert_eq!(StatsCalculator::coefficient_of_variation(&[]), 0.0);
        assert_eq!(StatsCalculator::coefficient_of_variation(&[5.0, 5.0, 5.0]), 0.0);
        assert!(!StatsCalculator::coefficient_of_variation(&[-1.0, 1.0]).is_finite());
    }

    #[test]
    fn coefficient_of_variation_uses_population_variance() {
        // mean 5, population std 2
        let cv = StatsCalculator::coefficient_of_variation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(close(cv, 0.4));
    }
}
