//! Data-driven alert thresholds
//!
//! Derives a warning and a critical cutoff per metric with one of three
//! methods:
//! - percentile: 90th / 95th percentile
//! - standard deviation: mean + 2σ / mean + 3σ
//! - IQR: Q3 + 1.5·IQR / Q3 + 3·IQR

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;
use crate::models::{Metric, ObservationTable};
use crate::stats::MetricSummary;
use crate::stats::moments;

/// How warning/critical cutoffs are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    #[default]
    Percentile,
    #[serde(rename = "std", alias = "standard_deviation")]
    StdDev,
    Iqr,
}

impl ThresholdMethod {
    /// Label recorded alongside computed thresholds
    pub fn label(&self) -> &'static str {
        match self {
            ThresholdMethod::Percentile => "percentile",
            ThresholdMethod::StdDev => "standard_deviation",
            ThresholdMethod::Iqr => "iqr",
        }
    }
}

impl std::fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ThresholdMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentile" => Ok(ThresholdMethod::Percentile),
            "std" | "standard_deviation" => Ok(ThresholdMethod::StdDev),
            "iqr" => Ok(ThresholdMethod::Iqr),
            _ => Err(AnalysisError::UnknownThresholdMethod(s.to_string())),
        }
    }
}

/// Warning and critical cutoffs of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
    pub method: ThresholdMethod,
}

impl Threshold {
    /// Derive cutoffs from non-null readings
    ///
    /// Returns `None` when the readings cannot support the method (no
    /// readings at all, or a single reading under the std method).
    pub fn from_values(values: &[f64], method: ThresholdMethod) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let (warning, critical) = match method {
            ThresholdMethod::Percentile => {
                let sorted = moments::sorted(values);
                (
                    moments::quantile_sorted(&sorted, 0.90),
                    moments::quantile_sorted(&sorted, 0.95),
                )
            }
            ThresholdMethod::StdDev => {
                let mean = moments::mean(values);
                let std = moments::std_dev(values);
                (mean + 2.0 * std, mean + 3.0 * std)
            }
            ThresholdMethod::Iqr => {
                let summary = MetricSummary::from_values(values);
                let iqr = summary.iqr();
                (summary.q3 + 1.5 * iqr, summary.q3 + 3.0 * iqr)
            }
        };

        (warning.is_finite() && critical.is_finite()).then_some(Self {
            warning,
            critical,
            method,
        })
    }
}

/// Thresholds for every present metric that has readings
pub fn calculate_thresholds(
    table: &ObservationTable,
    method: ThresholdMethod,
) -> BTreeMap<Metric, Threshold> {
    let mut thresholds = BTreeMap::new();

    for &metric in table.metrics() {
        match Threshold::from_values(&table.values(metric), method) {
            Some(threshold) => {
                debug!(
                    metric = %metric,
                    method = %method,
                    warning = threshold.warning,
                    critical = threshold.critical,
                    "Calculated thresholds"
                );
                thresholds.insert(metric, threshold);
            }
            None => debug!(metric = %metric, method = %method, "No threshold for metric"),
        }
    }

    thresholds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;

    const METHODS: [ThresholdMethod; 3] = [
        ThresholdMethod::Percentile,
        ThresholdMethod::StdDev,
        ThresholdMethod::Iqr,
    ];

    fn cpu_table(values: &[f64]) -> ObservationTable {
        let rows = values
            .iter()
            .map(|v| Observation::new(None).with_value(Metric::Cpu, *v))
            .collect();
        ObservationTable::from_rows(None, [Metric::Cpu], rows)
    }

    #[test]
    fn test_percentile_thresholds() {
        let table = cpu_table(&[70.0, 80.0, 90.0, 95.0, 99.0]);
        let t = calculate_thresholds(&table, ThresholdMethod::Percentile)[&Metric::Cpu];
        assert!((t.warning - 97.4).abs() < 1e-9);
        assert!((t.critical - 98.2).abs() < 1e-9);
        assert_eq!(t.method.label(), "percentile");
    }

    #[test]
    fn test_std_thresholds() {
        let table = cpu_table(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let t = calculate_thresholds(&table, ThresholdMethod::StdDev)[&Metric::Cpu];
        let std = (32.0f64 / 7.0).sqrt();
        assert!((t.warning - (5.0 + 2.0 * std)).abs() < 1e-9);
        assert!((t.critical - (5.0 + 3.0 * std)).abs() < 1e-9);
        assert_eq!(t.method.label(), "standard_deviation");
    }

    #[test]
    fn test_iqr_thresholds() {
        let table = cpu_table(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let t = calculate_thresholds(&table, ThresholdMethod::Iqr)[&Metric::Cpu];
        assert_eq!(t.warning, 4.0 + 1.5 * 2.0);
        assert_eq!(t.critical, 4.0 + 3.0 * 2.0);
    }

    #[test]
    fn test_critical_never_below_warning() {
        let samples: [&[f64]; 4] = [
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[10.0, 10.0, 10.0, 10.0],
            &[0.5, 90.0, 3.0, 47.0, 12.0, 12.0, 88.0],
            &[-5.0, -1.0, -3.0],
        ];
        for values in samples {
            for method in METHODS {
                let t = Threshold::from_values(values, method).unwrap();
                assert!(
                    t.critical >= t.warning,
                    "{method}: critical {} < warning {}",
                    t.critical,
                    t.warning
                );
            }
        }
    }

    #[test]
    fn test_empty_table_yields_no_thresholds() {
        let table = cpu_table(&[]);
        for method in METHODS {
            assert!(calculate_thresholds(&table, method).is_empty());
        }
    }

    #[test]
    fn test_single_reading_has_no_std_threshold() {
        assert!(Threshold::from_values(&[50.0], ThresholdMethod::StdDev).is_none());
        assert!(Threshold::from_values(&[50.0], ThresholdMethod::Percentile).is_some());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("percentile".parse::<ThresholdMethod>().unwrap(), ThresholdMethod::Percentile);
        assert_eq!("STD".parse::<ThresholdMethod>().unwrap(), ThresholdMethod::StdDev);
        assert_eq!(
            "standard_deviation".parse::<ThresholdMethod>().unwrap(),
            ThresholdMethod::StdDev
        );
        assert_eq!("iqr".parse::<ThresholdMethod>().unwrap(), ThresholdMethod::Iqr);
        assert!(matches!(
            "zscore".parse::<ThresholdMethod>(),
            Err(AnalysisError::UnknownThresholdMethod(m)) if m == "zscore"
        ));
    }

    #[test]
    fn test_method_deserializes_from_config_strings() {
        let method: ThresholdMethod = serde_json::from_str("\"std\"").unwrap();
        assert_eq!(method, ThresholdMethod::StdDev);
        let method: ThresholdMethod = serde_json::from_str("\"iqr\"").unwrap();
        assert_eq!(method, ThresholdMethod::Iqr);
        assert!(serde_json::from_str::<ThresholdMethod>("\"median\"").is_err());
    }
}
