//! Warning/critical set extraction

use std::collections::BTreeMap;

use serde::Serialize;

use super::AlertSeverity;
use crate::models::{Metric, ObservationTable};
use crate::thresholds::Threshold;

/// Rows of one metric exceeding its cutoffs
///
/// `critical_rows` is always a subset of `warning_rows` because the
/// critical cutoff is never below the warning cutoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricAnomalies {
    pub warning_count: usize,
    pub critical_count: usize,
    pub warning_percentage: f64,
    pub critical_percentage: f64,
    /// Row indices into the source table
    pub warning_rows: Vec<usize>,
    pub critical_rows: Vec<usize>,
}

impl MetricAnomalies {
    /// Highest severity any row reached
    pub fn highest_severity(&self) -> Option<AlertSeverity> {
        if self.critical_count > 0 {
            Some(AlertSeverity::Critical)
        } else if self.warning_count > 0 {
            Some(AlertSeverity::Warning)
        } else {
            None
        }
    }
}

/// Share of `total` rows, as a percentage; zero for an empty table
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Detect anomalies for every metric that has a threshold and a column
pub fn detect_anomalies(
    table: &ObservationTable,
    thresholds: &BTreeMap<Metric, Threshold>,
) -> BTreeMap<Metric, MetricAnomalies> {
    let total = table.len();

    thresholds
        .iter()
        .filter(|(metric, _)| table.has_metric(**metric))
        .map(|(&metric, threshold)| {
            let mut anomalies = MetricAnomalies::default();

            for (row, value) in table.indexed_values(metric) {
                let Some(value) = value else {
                    continue;
                };
                if value > threshold.warning {
                    anomalies.warning_rows.push(row);
                }
                if value > threshold.critical {
                    anomalies.critical_rows.push(row);
                }
            }

            anomalies.warning_count = anomalies.warning_rows.len();
            anomalies.critical_count = anomalies.critical_rows.len();
            anomalies.warning_percentage = percentage(anomalies.warning_count, total);
            anomalies.critical_percentage = percentage(anomalies.critical_count, total);

            (metric, anomalies)
        })
        .collect()
}
