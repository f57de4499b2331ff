//! End-to-end analysis pipeline
//!
//! Runs the stages strictly forward over one read-only table:
//! statistics, distribution, time patterns, thresholds, anomalies and
//! finally recommendations.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use crate::anomaly::{detect_anomalies, MetricAnomalies};
use crate::distribution::{analyze_distribution, DistributionSummary};
use crate::error::Result;
use crate::models::{Metric, ObservationTable};
use crate::observability::StructuredLogger;
use crate::patterns::{analyze_time_patterns, TimePatterns};
use crate::recommendations::{generate_recommendations, Recommendation};
use crate::stats::{describe, MetricSummary};
use crate::thresholds::{calculate_thresholds, Threshold, ThresholdMethod};

/// Everything one analysis run produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub row_count: usize,
    pub threshold_method: ThresholdMethod,
    pub statistics: BTreeMap<Metric, MetricSummary>,
    pub distributions: BTreeMap<Metric, DistributionSummary>,
    pub time_patterns: TimePatterns,
    pub thresholds: BTreeMap<Metric, Threshold>,
    pub anomalies: BTreeMap<Metric, MetricAnomalies>,
    pub recommendations: Vec<Recommendation>,
}

/// Runs the analysis stages with a chosen threshold method
pub struct Analyzer {
    method: ThresholdMethod,
    logger: StructuredLogger,
}

impl Analyzer {
    pub fn new(method: ThresholdMethod) -> Self {
        Self {
            method,
            logger: StructuredLogger::new("analysis"),
        }
    }

    /// Use a logger carrying a run-specific label
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn method(&self) -> ThresholdMethod {
        self.method
    }

    /// Analyze a loaded table
    ///
    /// Fails only when the table has no timestamp column, since time
    /// patterns are part of every report.
    pub fn run(&self, table: &ObservationTable) -> Result<AnalysisReport> {
        let statistics = self.stage("descriptive_statistics", || describe(table), BTreeMap::len);
        let distributions =
            self.stage("distribution", || analyze_distribution(table), BTreeMap::len);
        let time_patterns = self.stage(
            "time_patterns",
            || analyze_time_patterns(table),
            |p| p.as_ref().map(|p| p.hourly.len()).unwrap_or(0),
        );
        let time_patterns = match time_patterns {
            Ok(patterns) => patterns,
            Err(e) => {
                self.logger.log_failure(&e.to_string());
                return Err(e);
            }
        };

        let thresholds = self.stage(
            "thresholds",
            || calculate_thresholds(table, self.method),
            BTreeMap::len,
        );
        for (metric, threshold) in &thresholds {
            self.logger.log_threshold(*metric, threshold);
        }

        let anomalies = self.stage(
            "anomalies",
            || detect_anomalies(table, &thresholds),
            BTreeMap::len,
        );
        for (metric, found) in &anomalies {
            self.logger.log_anomalies(*metric, found);
        }

        let recommendations = generate_recommendations(&statistics, &anomalies, &time_patterns);
        self.logger.log_recommendations(recommendations.len());

        Ok(AnalysisReport {
            row_count: table.len(),
            threshold_method: self.method,
            statistics,
            distributions,
            time_patterns,
            thresholds,
            anomalies,
            recommendations,
        })
    }

    fn stage<T>(&self, name: &str, run: impl FnOnce() -> T, entries: impl Fn(&T) -> usize) -> T {
        let started = Instant::now();
        let output = run();
        self.logger.log_stage(name, entries(&output), started.elapsed());
        output
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(ThresholdMethod::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::models::{Observation, TimestampColumn};
    use chrono::NaiveDate;

    /// Two days of hourly readings with a hot afternoon
    fn two_day_table() -> ObservationTable {
        let mut rows = Vec::new();
        for day in 1..=2 {
            let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
            for hour in 0..24 {
                let ts = date.and_hms_opt(hour, 0, 0).unwrap();
                let cpu = if (13..=15).contains(&hour) { 92.0 + hour as f64 } else { 40.0 + hour as f64 };
                rows.push(
                    Observation::new(Some(ts))
                        .with_value(Metric::Cpu, cpu)
                        .with_value(Metric::Memory, 8.0 + (hour % 4) as f64)
                        .with_value(Metric::Network, 120.0 + hour as f64)
                        .with_value(Metric::Temperature, 38.0 + (hour % 6) as f64),
                );
            }
        }
        ObservationTable::from_rows(Some(TimestampColumn::Time), Metric::ALL, rows)
    }

    #[test]
    fn test_full_run() {
        let table = two_day_table();
        let report = Analyzer::default().run(&table).unwrap();

        assert_eq!(report.row_count, 48);
        assert_eq!(report.statistics.len(), 4);
        assert_eq!(report.distributions.len(), 4);
        assert_eq!(report.thresholds.len(), 4);
        assert_eq!(report.anomalies.len(), 4);
        assert_eq!(report.time_patterns.hourly.len(), 24);
        assert_eq!(report.time_patterns.daily.as_ref().map(|d| d.len()), Some(2));
        assert_eq!(report.threshold_method, ThresholdMethod::Percentile);

        let peak = report
            .recommendations
            .iter()
            .find(|r| r.rule == "peak_hours")
            .expect("peak hours recommendation");
        assert!(peak.message.contains("[15, 14, 13]"));
    }

    #[test]
    fn test_every_method_keeps_invariants() {
        let table = two_day_table();
        for method in [ThresholdMethod::Percentile, ThresholdMethod::StdDev, ThresholdMethod::Iqr] {
            let report = Analyzer::new(method).run(&table).unwrap();
            for (metric, threshold) in &report.thresholds {
                assert!(threshold.critical >= threshold.warning, "{metric} under {method}");
                let found = &report.anomalies[metric];
                assert!(found.critical_rows.iter().all(|r| found.warning_rows.contains(r)));
                assert!((0.0..=100.0).contains(&found.critical_percentage));
            }
        }
    }

    #[test]
    fn test_empty_table_with_time_column() {
        let table = ObservationTable::new(Some(TimestampColumn::Time), Metric::ALL);
        let report = Analyzer::default().run(&table).unwrap();

        assert_eq!(report.row_count, 0);
        assert!(report.thresholds.is_empty());
        assert!(report.anomalies.is_empty());
        assert!(report.time_patterns.hourly.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_missing_time_column_fails() {
        let rows = vec![Observation::new(None).with_value(Metric::Cpu, 99.0)];
        let table = ObservationTable::from_rows(None, [Metric::Cpu], rows);
        assert!(matches!(
            Analyzer::default().run(&table),
            Err(AnalysisError::MissingTimestampColumn)
        ));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = Analyzer::default().run(&two_day_table()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["row_count"], 48);
        assert!(json["statistics"]["CPU_Usage"]["mean"].is_number());
        assert_eq!(json["threshold_method"], "percentile");
    }
}
