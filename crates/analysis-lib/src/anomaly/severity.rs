//! Alert severity levels

use serde::{Deserialize, Serialize};

use crate::thresholds::Threshold;

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    /// Classify a reading against a metric's cutoffs
    ///
    /// Only readings strictly above a cutoff are flagged; NaN is never
    /// flagged.
    pub fn classify(value: f64, threshold: &Threshold) -> Option<Self> {
        if value > threshold.critical {
            Some(AlertSeverity::Critical)
        } else if value > threshold.warning {
            Some(AlertSeverity::Warning)
        } else {
            None
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::ThresholdMethod;

    fn threshold(warning: f64, critical: f64) -> Threshold {
        Threshold {
            warning,
            critical,
            method: ThresholdMethod::Percentile,
        }
    }

    #[test]
    fn test_classify_is_strict() {
        let t = threshold(80.0, 90.0);
        assert_eq!(AlertSeverity::classify(80.0, &t), None);
        assert_eq!(AlertSeverity::classify(80.5, &t), Some(AlertSeverity::Warning));
        assert_eq!(AlertSeverity::classify(90.0, &t), Some(AlertSeverity::Warning));
        assert_eq!(AlertSeverity::classify(90.1, &t), Some(AlertSeverity::Critical));
        assert_eq!(AlertSeverity::classify(f64::NAN, &t), None);
    }

    #[test]
    fn test_severity_ordering_and_display() {
        assert!(AlertSeverity::Critical > AlertSeverity::Warning);
        assert_eq!(AlertSeverity::Critical.to_string(), "critical");
        assert_eq!(
            serde_json::to_string(&AlertSeverity::Warning).unwrap(),
            "\"warning\""
        );
    }
}
