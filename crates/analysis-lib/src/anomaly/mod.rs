//! Threshold-based anomaly detection
//!
//! Flags every reading strictly above its metric's warning or critical
//! cutoff and reports how much of the table each set covers.

mod detector;
mod severity;

pub use detector::{detect_anomalies, percentage, MetricAnomalies};
pub use severity::AlertSeverity;
