//! Time-of-day and calendar-date usage patterns
//!
//! Readings are bucketed by hour of day (0-23) and by calendar date. Each
//! bucket carries mean, max and sample standard deviation per metric,
//! rounded to two decimals. The daily table is only produced when the data
//! spans more than one date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::models::{Metric, ObservationTable};
use crate::stats::moments;

/// Decimal places kept in bucket aggregates
const ROUND_PLACES: i32 = 2;

/// Aggregates of one metric within one time bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketStats {
    pub mean: f64,
    pub max: f64,
    pub std: f64,
}

impl BucketStats {
    fn from_values(values: &[f64]) -> Self {
        Self {
            mean: moments::round_to(moments::mean(values), ROUND_PLACES),
            max: moments::round_to(moments::max(values), ROUND_PLACES),
            std: moments::round_to(moments::std_dev(values), ROUND_PLACES),
        }
    }
}

/// Bucket key → metric → aggregates
pub type PatternTable<K> = BTreeMap<K, BTreeMap<Metric, BucketStats>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimePatterns {
    pub hourly: PatternTable<u32>,
    /// Present only when the table spans more than one calendar date
    pub daily: Option<PatternTable<NaiveDate>>,
}

impl TimePatterns {
    /// Hourly mean of a metric, skipping hours where it is undefined
    pub fn hourly_means(&self, metric: Metric) -> Vec<(u32, f64)> {
        self.hourly
            .iter()
            .filter_map(|(hour, metrics)| metrics.get(&metric).map(|s| (*hour, s.mean)))
            .filter(|(_, mean)| !mean.is_nan())
            .collect()
    }

    /// The `count` hours with the highest mean, highest first
    ///
    /// Ties keep ascending hour order.
    pub fn peak_hours(&self, metric: Metric, count: usize) -> Vec<u32> {
        let mut means = self.hourly_means(metric);
        means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        means.into_iter().take(count).map(|(hour, _)| hour).collect()
    }
}

/// Bucket the table by hour of day and, for multi-day data, by date
pub fn analyze_time_patterns(table: &ObservationTable) -> Result<TimePatterns> {
    if table.timestamp_column().is_none() {
        return Err(AnalysisError::MissingTimestampColumn);
    }

    let hourly = group_by(table, |ts| ts.hour());

    let dates: BTreeSet<NaiveDate> = table
        .rows()
        .iter()
        .filter_map(|r| r.timestamp.map(|ts| ts.date()))
        .collect();

    let daily = (dates.len() > 1).then(|| group_by(table, |ts| ts.date()));

    Ok(TimePatterns { hourly, daily })
}

fn group_by<K, F>(table: &ObservationTable, key: F) -> PatternTable<K>
where
    K: Ord,
    F: Fn(&NaiveDateTime) -> K,
{
    let mut buckets: BTreeMap<K, BTreeMap<Metric, Vec<f64>>> = BTreeMap::new();

    for row in table.rows() {
        let Some(ts) = row.timestamp else {
            continue;
        };
        let bucket = buckets.entry(key(&ts)).or_default();
        for &metric in table.metrics() {
            let values = bucket.entry(metric).or_default();
            if let Some(v) = row.value(metric) {
                values.push(v);
            }
        }
    }

    buckets
        .into_iter()
        .map(|(k, metrics)| {
            let stats = metrics
                .into_iter()
                .map(|(metric, values)| (metric, BucketStats::from_values(&values)))
                .collect();
            (k, stats)
        })
        .collect()
}
