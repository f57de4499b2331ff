//! Distribution analysis per metric
//!
//! Runs two normality tests on each metric's non-null readings and reports
//! the shape moments:
//! - Shapiro-Wilk, only for samples of at most [`SHAPIRO_MAX_SAMPLES`]
//! - one-sample Kolmogorov-Smirnov against a normal fitted to the sample
//! - skewness and excess kurtosis
//!
//! The normality verdict prefers the Shapiro-Wilk p-value and falls back to
//! the KS p-value when Shapiro-Wilk was not computed.

use std::collections::BTreeMap;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::models::{Metric, ObservationTable};
use crate::stats::moments;

/// Largest sample the Shapiro-Wilk test is run on
pub const SHAPIRO_MAX_SAMPLES: usize = 5000;

/// p-value above which a sample is considered normal
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Statistic and p-value of a hypothesis test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestOutcome {
    fn undefined() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
        }
    }
}

/// Distribution shape of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub sample_size: usize,
    /// `None` when the sample is too large or the test could not be evaluated
    pub shapiro: Option<TestOutcome>,
    pub ks: TestOutcome,
    pub skewness: f64,
    /// Excess (Fisher) kurtosis
    pub kurtosis: f64,
    pub is_normal: bool,
}

/// Distribution summaries for every metric present in the table
pub fn analyze_distribution(table: &ObservationTable) -> BTreeMap<Metric, DistributionSummary> {
    table
        .metrics()
        .iter()
        .map(|&metric| {
            let summary = summarize_distribution(&table.values(metric));
            debug!(
                metric = %metric,
                sample_size = summary.sample_size,
                shapiro_computed = summary.shapiro.is_some(),
                is_normal = summary.is_normal,
                "Analyzed metric distribution"
            );
            (metric, summary)
        })
        .collect()
}

/// Analyze one sample of non-null readings
pub fn summarize_distribution(values: &[f64]) -> DistributionSummary {
    let shapiro = if values.len() <= SHAPIRO_MAX_SAMPLES {
        shapiro_wilk(values)
    } else {
        None
    };

    let ks = ks_normal_test(values);

    DistributionSummary {
        sample_size: values.len(),
        shapiro,
        ks,
        skewness: moments::skewness(values),
        kurtosis: moments::excess_kurtosis(values),
        is_normal: normality_verdict(shapiro.as_ref(), &ks),
    }
}

/// Shapiro-Wilk p-value when available, otherwise the KS p-value
pub fn normality_verdict(shapiro: Option<&TestOutcome>, ks: &TestOutcome) -> bool {
    match shapiro.filter(|s| !s.p_value.is_nan()) {
        Some(s) => s.p_value > SIGNIFICANCE_LEVEL,
        None => ks.p_value > SIGNIFICANCE_LEVEL,
    }
}

fn shapiro_wilk(values: &[f64]) -> Option<TestOutcome> {
    if values.len() < 3 || moments::max(values) - moments::min(values) <= 0.0 {
        return None;
    }

    match normality::shapiro_wilk(values.to_vec()) {
        Ok(result) => Some(TestOutcome {
            statistic: result.statistic,
            p_value: result.p_value,
        }),
        Err(e) => {
            debug!(sample_size = values.len(), error = ?e, "Shapiro-Wilk not computed");
            None
        }
    }
}

/// One-sample KS test against Normal(sample mean, sample std)
fn ks_normal_test(values: &[f64]) -> TestOutcome {
    let Ok(normal) = Normal::new(moments::mean(values), moments::std_dev(values)) else {
        return TestOutcome::undefined();
    };

    let sorted = moments::sorted(values);
    let n = sorted.len() as f64;

    let statistic = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let cdf = normal.cdf(x);
            let above = (i + 1) as f64 / n - cdf;
            let below = cdf - i as f64 / n;
            above.max(below)
        })
        .fold(0.0, f64::max);

    TestOutcome {
        statistic,
        p_value: ks_p_value(statistic, sorted.len()),
    }
}

/// Two-sided KS p-value from the Kolmogorov distribution with Stephens'
/// small-sample correction
fn ks_p_value(d: f64, n: usize) -> f64 {
    let sqrt_n = (n as f64).sqrt();
    kolmogorov_survival((sqrt_n + 0.12 + 0.11 / sqrt_n) * d)
}

/// Q(λ) = 2 Σ (-1)^(j-1) exp(-2 j² λ²)
fn kolmogorov_survival(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous = 0.0;

    for j in 1..=100u32 {
        let term = sign * (a2 * f64::from(j * j)).exp();
        sum += term;
        if term.abs() <= 1e-3 * previous || term.abs() <= 1e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous = term.abs();
    }

    // Series fails to converge only for tiny λ, where Q(λ) → 1
    1.0
}
