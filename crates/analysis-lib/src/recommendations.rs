//! Rule-based optimization recommendations
//!
//! Each rule is an independent predicate over the analysis results that
//! yields at most one message. Rules run in a fixed order (CPU, memory,
//! network, time of day, temperature), so the output order is stable.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::anomaly::MetricAnomalies;
use crate::models::Metric;
use crate::patterns::TimePatterns;
use crate::stats::MetricSummary;

const CPU_HIGH_MEAN: f64 = 75.0;
const CPU_MODERATE_MEAN: f64 = 60.0;
const CPU_CRITICAL_SHARE: f64 = 5.0;
const MEMORY_PEAK_GB: f64 = 15.0;
const MEMORY_STD_GB: f64 = 2.0;
const NETWORK_CAPACITY: f64 = 200.0;
const NETWORK_HIGH_MEAN: f64 = 150.0;
const TEMPERATURE_PEAK_C: f64 = 50.0;
const PEAK_HOUR_COUNT: usize = 3;

/// Results the rules are evaluated against
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub summaries: &'a BTreeMap<Metric, MetricSummary>,
    pub anomalies: &'a BTreeMap<Metric, MetricAnomalies>,
    pub patterns: &'a TimePatterns,
}

impl RuleInput<'_> {
    fn summary(&self, metric: Metric) -> Option<&MetricSummary> {
        self.summaries.get(&metric)
    }
}

/// One generated recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Name of the rule that fired
    pub rule: &'static str,
    pub message: String,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// A named predicate → message pair
pub struct Rule {
    pub name: &'static str,
    evaluate: fn(&RuleInput<'_>) -> Option<String>,
}

impl Rule {
    pub fn evaluate(&self, input: &RuleInput<'_>) -> Option<Recommendation> {
        (self.evaluate)(input).map(|message| Recommendation {
            rule: self.name,
            message,
        })
    }
}

/// All rules, in evaluation order
pub const RULES: &[Rule] = &[
    Rule { name: "cpu_usage_level", evaluate: cpu_usage_level },
    Rule { name: "cpu_spikes", evaluate: cpu_spikes },
    Rule { name: "memory_peak", evaluate: memory_peak },
    Rule { name: "memory_variability", evaluate: memory_variability },
    Rule { name: "network_saturation", evaluate: network_saturation },
    Rule { name: "network_high_usage", evaluate: network_high_usage },
    Rule { name: "peak_hours", evaluate: peak_hours },
    Rule { name: "temperature_alert", evaluate: temperature_alert },
];

pub fn generate_recommendations(
    summaries: &BTreeMap<Metric, MetricSummary>,
    anomalies: &BTreeMap<Metric, MetricAnomalies>,
    patterns: &TimePatterns,
) -> Vec<Recommendation> {
    let input = RuleInput {
        summaries,
        anomalies,
        patterns,
    };
    RULES.iter().filter_map(|rule| rule.evaluate(&input)).collect()
}

// High and moderate CPU are one rule so the first match wins.
fn cpu_usage_level(input: &RuleInput<'_>) -> Option<String> {
    let mean = input.summary(Metric::Cpu)?.mean;
    if mean > CPU_HIGH_MEAN {
        Some(format!(
            "🔴 HIGH CPU USAGE: Average CPU usage is {mean:.1}%. \
             Consider load balancing, process optimization, or hardware upgrades."
        ))
    } else if mean > CPU_MODERATE_MEAN {
        Some(format!(
            "🟡 MODERATE CPU USAGE: Average CPU usage is {mean:.1}%. \
             Monitor peak hours and consider workload distribution."
        ))
    } else {
        None
    }
}

fn cpu_spikes(input: &RuleInput<'_>) -> Option<String> {
    input.summary(Metric::Cpu)?;
    let share = input
        .anomalies
        .get(&Metric::Cpu)
        .map(|a| a.critical_percentage)
        .unwrap_or(0.0);

    (share > CPU_CRITICAL_SHARE).then(|| {
        format!(
            "⚠️ CPU SPIKES: {share:.1}% of time shows critical CPU usage. \
             Investigate resource-intensive processes during peak hours."
        )
    })
}

fn memory_peak(input: &RuleInput<'_>) -> Option<String> {
    let max = input.summary(Metric::Memory)?.max;
    (max > MEMORY_PEAK_GB).then(|| {
        format!(
            "🔴 MEMORY CONCERN: Peak memory usage reaches {max:.1}GB. \
             Consider memory optimization and garbage collection tuning."
        )
    })
}

fn memory_variability(input: &RuleInput<'_>) -> Option<String> {
    let std = input.summary(Metric::Memory)?.std;
    (std > MEMORY_STD_GB).then(|| {
        format!(
            "📊 MEMORY VARIABILITY: High memory usage variability (std: {std:.1}GB). \
             Implement memory pooling and optimize application memory management."
        )
    })
}

fn network_saturation(input: &RuleInput<'_>) -> Option<String> {
    let max = input.summary(Metric::Network)?.max;
    (max >= NETWORK_CAPACITY).then(|| {
        "🌐 NETWORK SATURATION: Network usage reaches maximum capacity. \
         Consider bandwidth optimization, traffic shaping, or network upgrades."
            .to_string()
    })
}

fn network_high_usage(input: &RuleInput<'_>) -> Option<String> {
    let mean = input.summary(Metric::Network)?.mean;
    (mean > NETWORK_HIGH_MEAN).then(|| {
        format!(
            "🌐 HIGH NETWORK USAGE: Average network usage is {mean:.1}. \
             Optimize data transfer protocols and implement caching strategies."
        )
    })
}

fn peak_hours(input: &RuleInput<'_>) -> Option<String> {
    let hours = input.patterns.peak_hours(Metric::Cpu, PEAK_HOUR_COUNT);
    if hours.is_empty() {
        return None;
    }
    let listed = hours
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "⏰ PEAK HOURS IDENTIFIED: Highest CPU usage during hours [{listed}]. \
         Schedule intensive tasks outside these periods and implement auto-scaling."
    ))
}

fn temperature_alert(input: &RuleInput<'_>) -> Option<String> {
    let max = input.summary(Metric::Temperature)?.max;
    (max > TEMPERATURE_PEAK_C).then(|| {
        format!(
            "🌡️ TEMPERATURE ALERT: Peak temperature reaches {max:.1}°C. \
             Check cooling systems and ensure proper ventilation."
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::BucketStats;

    fn summary(mean: f64, std: f64, max: f64) -> MetricSummary {
        MetricSummary {
            mean,
            median: mean,
            std,
            min: 0.0,
            max,
            q1: mean,
            q3: mean,
            count: 100,
        }
    }

    fn rules_fired(
        summaries: &BTreeMap<Metric, MetricSummary>,
        anomalies: &BTreeMap<Metric, MetricAnomalies>,
        patterns: &TimePatterns,
    ) -> Vec<&'static str> {
        generate_recommendations(summaries, anomalies, patterns)
            .into_iter()
            .map(|r| r.rule)
            .collect()
    }

    fn hourly_cpu(means: &[(u32, f64)]) -> TimePatterns {
        let hourly = means
            .iter()
            .map(|&(hour, mean)| {
                let stats = BucketStats { mean, max: mean, std: 0.0 };
                (hour, BTreeMap::from([(Metric::Cpu, stats)]))
            })
            .collect();
        TimePatterns { hourly, daily: None }
    }

    #[test]
    fn test_no_results_no_recommendations() {
        let recs = generate_recommendations(&BTreeMap::new(), &BTreeMap::new(), &TimePatterns::default());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_cpu_high_and_moderate_are_exclusive() {
        let empty = BTreeMap::new();
        let patterns = TimePatterns::default();

        let high = BTreeMap::from([(Metric::Cpu, summary(80.0, 5.0, 95.0))]);
        let recs = generate_recommendations(&high, &empty, &patterns);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].message.starts_with("🔴 HIGH CPU USAGE: Average CPU usage is 80.0%."));

        let moderate = BTreeMap::from([(Metric::Cpu, summary(65.0, 5.0, 95.0))]);
        let recs = generate_recommendations(&moderate, &empty, &patterns);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].message.contains("MODERATE CPU USAGE"));

        let idle = BTreeMap::from([(Metric::Cpu, summary(60.0, 5.0, 95.0))]);
        assert!(generate_recommendations(&idle, &empty, &patterns).is_empty());
    }

    #[test]
    fn test_cpu_spikes_cooccur_with_usage_level() {
        let summaries = BTreeMap::from([(Metric::Cpu, summary(80.0, 5.0, 99.0))]);
        let anomalies = BTreeMap::from([(
            Metric::Cpu,
            MetricAnomalies {
                critical_percentage: 7.5,
                ..Default::default()
            },
        )]);

        let recs = generate_recommendations(&summaries, &anomalies, &TimePatterns::default());
        assert_eq!(
            recs.iter().map(|r| r.rule).collect::<Vec<_>>(),
            vec!["cpu_usage_level", "cpu_spikes"]
        );
        assert!(recs[1].message.contains("7.5% of time"));
    }

    #[test]
    fn test_memory_rules_are_independent() {
        let empty = BTreeMap::new();
        let patterns = TimePatterns::default();

        let both = BTreeMap::from([(Metric::Memory, summary(10.0, 2.5, 15.5))]);
        assert_eq!(
            rules_fired(&both, &empty, &patterns),
            vec!["memory_peak", "memory_variability"]
        );

        let only_var = BTreeMap::from([(Metric::Memory, summary(10.0, 2.5, 15.0))]);
        assert_eq!(rules_fired(&only_var, &empty, &patterns), vec!["memory_variability"]);
    }

    #[test]
    fn test_network_saturation_is_inclusive() {
        let empty = BTreeMap::new();
        let summaries = BTreeMap::from([(Metric::Network, summary(100.0, 10.0, 200.0))]);
        assert_eq!(
            rules_fired(&summaries, &empty, &TimePatterns::default()),
            vec!["network_saturation"]
        );

        let busy = BTreeMap::from([(Metric::Network, summary(160.0, 10.0, 199.0))]);
        let recs = generate_recommendations(&busy, &empty, &TimePatterns::default());
        assert_eq!(recs.len(), 1);
        assert!(recs[0].message.contains("Average network usage is 160.0"));
    }

    #[test]
    fn test_peak_hours_message() {
        let patterns = hourly_cpu(&[(8, 40.0), (9, 70.0), (13, 85.0), (14, 70.0), (22, 10.0)]);
        let recs = generate_recommendations(&BTreeMap::new(), &BTreeMap::new(), &patterns);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].rule, "peak_hours");
        assert!(recs[0].message.contains("during hours [13, 9, 14]"));
    }

    #[test]
    fn test_temperature_alert() {
        let summaries = BTreeMap::from([(Metric::Temperature, summary(40.0, 3.0, 52.34))]);
        let recs = generate_recommendations(&summaries, &BTreeMap::new(), &TimePatterns::default());
        assert_eq!(recs.len(), 1);
        assert!(recs[0].message.contains("Peak temperature reaches 52.3°C"));
    }

    #[test]
    fn test_fixed_section_order() {
        let summaries = BTreeMap::from([
            (Metric::Temperature, summary(45.0, 3.0, 60.0)),
            (Metric::Network, summary(180.0, 10.0, 210.0)),
            (Metric::Memory, summary(12.0, 3.0, 16.0)),
            (Metric::Cpu, summary(90.0, 5.0, 100.0)),
        ]);
        let anomalies = BTreeMap::from([(
            Metric::Cpu,
            MetricAnomalies {
                critical_percentage: 10.0,
                ..Default::default()
            },
        )]);
        let patterns = hourly_cpu(&[(1, 50.0), (2, 60.0)]);

        assert_eq!(
            rules_fired(&summaries, &anomalies, &patterns),
            vec![
                "cpu_usage_level",
                "cpu_spikes",
                "memory_peak",
                "memory_variability",
                "network_saturation",
                "network_high_usage",
                "peak_hours",
                "temperature_alert",
            ]
        );
    }
}
