//! Sample moment and quantile helpers
//!
//! All helpers take the non-null readings of one metric. Undefined results
//! (empty input, fewer than two samples for a spread, zero variance for a
//! standardized moment) are NaN so callers can propagate them unchanged.

use std::cmp::Ordering;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with Bessel's correction
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(f64::NAN)
}

pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(f64::NAN)
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Quantile of already-sorted data, linear interpolation between closest ranks
///
/// `q` is in `[0, 1]`; the rank is `(n - 1) * q`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

pub fn quantile(values: &[f64], q: f64) -> f64 {
    quantile_sorted(&sorted(values), q)
}

/// Biased central moment of order `k`
fn central_moment(values: &[f64], mean: f64, k: i32) -> f64 {
    values.iter().map(|v| (v - mean).powi(k)).sum::<f64>() / values.len() as f64
}

/// Fisher-Pearson coefficient of skewness, g1 = m3 / m2^1.5
pub fn skewness(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mean = mean(values);
    let m2 = central_moment(values, mean, 2);
    if m2 <= f64::EPSILON * mean.abs().max(1.0) {
        return f64::NAN;
    }
    central_moment(values, mean, 3) / m2.powf(1.5)
}

/// Excess kurtosis, g2 = m4 / m2^2 - 3
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mean = mean(values);
    let m2 = central_moment(values, mean, 2);
    if m2 <= f64::EPSILON * mean.abs().max(1.0) {
        return f64::NAN;
    }
    central_moment(values, mean, 4) / (m2 * m2) - 3.0
}

/// Pearson correlation over paired samples
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom < f64::EPSILON {
        return f64::NAN;
    }
    cov / denom
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
