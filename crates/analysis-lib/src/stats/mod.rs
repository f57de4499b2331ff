//! Descriptive statistics per metric

pub mod moments;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Metric, ObservationTable};

/// Scalar aggregates of one metric's non-null readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub count: usize,
}

impl MetricSummary {
    /// Summarize readings; aggregates of an empty slice are NaN
    pub fn from_values(values: &[f64]) -> Self {
        let sorted = moments::sorted(values);
        Self {
            mean: moments::mean(values),
            median: moments::quantile_sorted(&sorted, 0.5),
            std: moments::std_dev(values),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            q1: moments::quantile_sorted(&sorted, 0.25),
            q3: moments::quantile_sorted(&sorted, 0.75),
            count: values.len(),
        }
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Summaries for every metric present in the table
///
/// Metrics absent from the table have no entry.
pub fn describe(table: &ObservationTable) -> BTreeMap<Metric, MetricSummary> {
    table
        .metrics()
        .iter()
        .map(|&metric| (metric, MetricSummary::from_values(&table.values(metric))))
        .collect()
}
