//! Structured logging for analysis runs
//!
//! Every significant pipeline event is emitted as a `tracing` event with an
//! `event` field and the run label, so JSON output can be filtered per run.

use std::time::Duration;

use tracing::{info, warn};

use crate::anomaly::{AlertSeverity, MetricAnomalies};
use crate::models::Metric;
use crate::thresholds::Threshold;

/// Structured logger for analysis events
#[derive(Clone)]
pub struct StructuredLogger {
    run_label: String,
}

impl StructuredLogger {
    pub fn new(run_label: impl Into<String>) -> Self {
        Self {
            run_label: run_label.into(),
        }
    }

    pub fn run_label(&self) -> &str {
        &self.run_label
    }

    /// Log analyzer startup
    pub fn log_startup(&self, version: &str, method: &str) {
        info!(
            event = "analysis_started",
            run = %self.run_label,
            analyzer_version = %version,
            threshold_method = %method,
            "Starting server performance analysis"
        );
    }

    /// Log completion of one pipeline stage
    pub fn log_stage(&self, stage: &str, entries: usize, elapsed: Duration) {
        info!(
            event = "stage_completed",
            run = %self.run_label,
            stage = %stage,
            entries = entries,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Analysis stage completed"
        );
    }

    /// Log the cutoffs derived for a metric
    pub fn log_threshold(&self, metric: Metric, threshold: &Threshold) {
        info!(
            event = "threshold_calculated",
            run = %self.run_label,
            metric = %metric,
            method = %threshold.method,
            warning = threshold.warning,
            critical = threshold.critical,
            "Threshold calculated"
        );
    }

    /// Log the anomaly counts of a metric
    pub fn log_anomalies(&self, metric: Metric, anomalies: &MetricAnomalies) {
        match anomalies.highest_severity() {
            Some(AlertSeverity::Critical) => {
                warn!(
                    event = "anomalies_detected",
                    run = %self.run_label,
                    metric = %metric,
                    severity = %AlertSeverity::Critical,
                    warning_count = anomalies.warning_count,
                    critical_count = anomalies.critical_count,
                    critical_percentage = anomalies.critical_percentage,
                    "Critical anomalies detected"
                );
            }
            Some(severity) => {
                info!(
                    event = "anomalies_detected",
                    run = %self.run_label,
                    metric = %metric,
                    severity = %severity,
                    warning_count = anomalies.warning_count,
                    warning_percentage = anomalies.warning_percentage,
                    "Anomalies detected"
                );
            }
            None => {}
        }
    }

    /// Log the number of generated recommendations
    pub fn log_recommendations(&self, count: usize) {
        info!(
            event = "recommendations_generated",
            run = %self.run_label,
            count = count,
            "Generated optimization recommendations"
        );
    }

    /// Log chart output
    pub fn log_charts(&self, directory: &str, charts: usize) {
        info!(
            event = "charts_rendered",
            run = %self.run_label,
            directory = %directory,
            charts = charts,
            "Visualizations written"
        );
    }

    /// Log a failed run
    pub fn log_failure(&self, reason: &str) {
        warn!(
            event = "analysis_failed",
            run = %self.run_label,
            reason = %reason,
            "Analysis failed"
        );
    }
}
