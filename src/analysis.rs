//! Supply Chain Analysis Module
//! Runs every analysis once over the enriched table and collects the results.

use crate::charts::{
    ChartData, ChartKind, Finding, HistogramChart, ScatterData, ScatterPoint, TablePreview,
};
use crate::config::{AnalysisConfig, FieldMap, DELAY_DURATION, LEAD_TIME, MONTH};
use crate::data::{DataProcessor, Table, MONTH_NAMES};
use crate::stats::{
    correlation_matrix, default_bin_count, histogram, ColumnSummary, CorrelationMatrix,
    GroupAccumulator, GroupAverages, StatsCalculator,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadTimeFindings {
    /// Supplier with the highest average lead time.
    pub slowest_supplier: Option<Finding>,
    /// Transportation mode with the lowest average lead time.
    pub fastest_transport: Option<Finding>,
    /// Product category with the shortest average lead time.
    pub fastest_category: Option<Finding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayFindings {
    pub worst_month: Option<Finding>,
    pub worst_disruption: Option<Finding>,
}

/// Everything the presentation layer needs for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub row_count: usize,
    pub fields: FieldMap,
    pub lead_times: LeadTimeFindings,
    pub delays: DelayFindings,
    pub transportation_impact: ChartData,
    pub seasonal_pattern: ChartData,
    pub bullwhip: ChartData,
    pub variability: ScatterData,
    pub summary: Vec<ColumnSummary>,
    pub correlation: CorrelationMatrix,
    pub histograms: Vec<HistogramChart>,
    pub preview: TablePreview,
}

/// Analysis entry point. Holds only configuration; all state lives in the
/// table passed to each call.
pub struct SupplyChainAnalyzer {
    config: AnalysisConfig,
}

impl Default for SupplyChainAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl SupplyChainAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Enrich a freshly parsed table and run every analysis on it.
    pub fn run(&self, raw: &Table) -> AnalysisReport {
        let fields = self.config.resolve_fields(raw.columns());
        let missing = fields.missing(raw.columns());
        if !missing.is_empty() {
            log::warn!("Columns not found in file: {}", missing.join(", "));
        }

        let table = DataProcessor::enrich(raw, &fields);
        let report = self.analyze(&table, &fields);
        log::info!("Analysis complete for {} rows", report.row_count);
        report
    }

    /// Run every analysis on an already enriched table.
    pub fn analyze(&self, table: &Table, fields: &FieldMap) -> AnalysisReport {
        log::debug!("Analyzing lead times and delays");
        let lead_times = self.lead_time_findings(table, fields);
        let delays = self.delay_findings(table, fields);

        log::debug!("Analyzing transportation, seasonal and variability patterns");
        let transportation_impact = self.transportation_impact(table, fields);
        let seasonal_pattern = self.seasonal_pattern(table);
        let bullwhip = self.bullwhip_effect(table, fields);
        let variability = self.variability_correlation(table, fields);

        log::debug!("Summarizing {} columns", table.columns().len());
        let summary = self.column_summaries(table);
        let correlation = self.correlation_heatmap(table, &summary);
        let histograms = self.distributions(table, fields);

        AnalysisReport {
            row_count: table.len(),
            fields: fields.clone(),
            lead_times,
            delays,
            transportation_impact,
            seasonal_pattern,
            bullwhip,
            variability,
            summary,
            correlation,
            histograms,
            preview: TablePreview::from_table(table, self.config.preview_rows),
        }
    }

    fn average(&self, table: &Table, group: &str, value: &str) -> GroupAverages {
        StatsCalculator::group_average(table, group, value, self.config.key_filter)
    }

    pub fn lead_time_findings(&self, table: &Table, fields: &FieldMap) -> LeadTimeFindings {
        LeadTimeFindings {
            slowest_supplier: Finding::from_pair(
                self.average(table, &fields.supplier, LEAD_TIME).highest(),
            ),
            fastest_transport: Finding::from_pair(
                self.average(table, &fields.transportation_mode, LEAD_TIME).lowest(),
            ),
            fastest_category: Finding::from_pair(
                self.average(table, &fields.product_category, LEAD_TIME).lowest(),
            ),
        }
    }

    pub fn delay_findings(&self, table: &Table, fields: &FieldMap) -> DelayFindings {
        DelayFindings {
            worst_month: Finding::from_pair(self.average(table, MONTH, DELAY_DURATION).highest()),
            worst_disruption: Finding::from_pair(
                self.average(table, &fields.disruption_type, DELAY_DURATION).highest(),
            ),
        }
    }

    /// Average delay per transportation mode. The delay itself must pass the
    /// key filter too, so in truthy mode on-time rows (delay 0) are excluded.
    pub fn transportation_impact(&self, table: &Table, fields: &FieldMap) -> ChartData {
        let filter = self.config.key_filter;
        let mut acc = GroupAccumulator::default();
        for (mode, delay) in table
            .column(&fields.transportation_mode)
            .zip(table.column(DELAY_DURATION))
        {
            if !filter.admits(mode) {
                continue;
            }
            if let Some(d) = filter.sample(delay) {
                acc.add(mode.to_string(), d);
            }
        }
        ChartData::from_groups(
            "Transportation Impact",
            ChartKind::Bar,
            "Average Delay (days)",
            &acc.averages(),
        )
    }

    /// Average lead time per calendar month; months without data report 0.
    pub fn seasonal_pattern(&self, table: &Table) -> ChartData {
        let monthly = self.average(table, MONTH, LEAD_TIME);
        let values = MONTH_NAMES
            .iter()
            .map(|m| monthly.get(m).unwrap_or(0.0))
            .collect();
        ChartData::new(
            "Seasonal Pattern",
            ChartKind::Line,
            "Average Lead Time (days)",
            Self::month_labels(),
        )
        .with_dataset("Average Lead Time", values)
    }

    /// CV of customer demand against CV of order quantity for each month.
    pub fn bullwhip_effect(&self, table: &Table, fields: &FieldMap) -> ChartData {
        let filter = self.config.key_filter;
        let mut demand: HashMap<String, Vec<f64>> = HashMap::new();
        let mut orders: HashMap<String, Vec<f64>> = HashMap::new();

        for row in 0..table.len() {
            let month = table.get(row, MONTH);
            if !filter.admits(month) {
                continue;
            }
            let month = month.to_string();
            if let Some(d) = filter.sample(table.get(row, &fields.customer_demand)) {
                demand.entry(month.clone()).or_default().push(d);
            }
            if let Some(q) = filter.sample(table.get(row, &fields.order_quantity)) {
                orders.entry(month).or_default().push(q);
            }
        }

        let cv_by_month = |samples: &HashMap<String, Vec<f64>>| -> Vec<f64> {
            MONTH_NAMES
                .iter()
                .map(|m| {
                    samples
                        .get(*m)
                        .map(|s| StatsCalculator::coefficient_of_variation(s))
                        .unwrap_or(0.0)
                })
                .collect()
        };

        ChartData::new(
            "Bullwhip Effect",
            ChartKind::Line,
            "Coefficient of Variation",
            Self::month_labels(),
        )
        .with_dataset("Customer Demand Variability", cv_by_month(&demand))
        .with_dataset("Order Quantity Variability", cv_by_month(&orders))
    }

    /// Per month, order-quantity CV against lead-time CV, over rows where all
    /// three fields pass the key filter. Months appear in first-seen order.
    pub fn variability_correlation(&self, table: &Table, fields: &FieldMap) -> ScatterData {
        let filter = self.config.key_filter;
        let mut order: Vec<String> = Vec::new();
        let mut samples: HashMap<String, (Vec<f64>, Vec<f64>)> = HashMap::new();

        for row in 0..table.len() {
            let month = table.get(row, MONTH);
            let quantity = filter.sample(table.get(row, &fields.order_quantity));
            let lead_time = filter.sample(table.get(row, LEAD_TIME));
            let (Some(q), Some(l)) = (quantity, lead_time) else {
                continue;
            };
            if !filter.admits(month) {
                continue;
            }
            let month = month.to_string();
            if !samples.contains_key(&month) {
                order.push(month.clone());
            }
            let entry = samples.entry(month).or_default();
            entry.0.push(q);
            entry.1.push(l);
        }

        let points = order
            .into_iter()
            .filter_map(|month| {
                let (quantities, lead_times) = samples.get(&month)?;
                Some(ScatterPoint {
                    x: StatsCalculator::coefficient_of_variation(quantities),
                    y: StatsCalculator::coefficient_of_variation(lead_times),
                    label: month,
                })
            })
            .collect();

        ScatterData {
            title: "Order Variability vs Lead Time Variability".to_string(),
            x_label: "Order Quantity CV".to_string(),
            y_label: "Lead Time CV".to_string(),
            points,
        }
    }

    pub fn column_summaries(&self, table: &Table) -> Vec<ColumnSummary> {
        table
            .columns()
            .iter()
            .map(|c| StatsCalculator::describe_column(table, c, self.config.top_categories))
            .collect()
    }

    /// Correlation matrix over numeric columns that have data, limited to
    /// `max_correlation_columns` in header order.
    pub fn correlation_heatmap(&self, table: &Table, summary: &[ColumnSummary]) -> CorrelationMatrix {
        let mut columns: Vec<String> = summary
            .iter()
            .filter(|s| s.is_numeric() && s.count > 0)
            .map(|s| s.column.clone())
            .collect();

        let limit = self.config.max_correlation_columns;
        if columns.len() > limit {
            log::warn!(
                "Correlation limited to the first {} of {} numeric columns",
                limit,
                columns.len()
            );
            columns.truncate(limit);
        }

        correlation_matrix(table, &columns)
    }

    /// Histograms of the lead time, delay, demand and quantity columns that
    /// hold numeric data.
    pub fn distributions(&self, table: &Table, fields: &FieldMap) -> Vec<HistogramChart> {
        [
            LEAD_TIME,
            DELAY_DURATION,
            fields.customer_demand.as_str(),
            fields.order_quantity.as_str(),
        ]
        .into_iter()
        .filter_map(|column| {
            let values = table.finite_values(column);
            if values.is_empty() {
                return None;
            }
            let bins = default_bin_count(values.len(), self.config.max_histogram_bins);
            Some(HistogramChart::new(column, histogram(&values, Some(bins))))
        })
        .collect()
    }

    fn month_labels() -> Vec<String> {
        MONTH_NAMES.iter().map(|m| m.to_string()).collect()
    }
}
