//! Descriptive diagnostics of a constructed spread.

use serde::{Deserialize, Serialize};

use crate::stats::descriptive::{diff, finite, mean, std_dev};

/// Default `|z|` above which a move counts as a spike.
pub const DEFAULT_SPIKE_Z: f64 = 3.0;

/// Distributional summary of a spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadSummary {
    pub mean: f64,
    pub std: f64,
    /// Adjusted Fisher-Pearson skewness.
    pub skew: f64,
    /// Bias-corrected excess kurtosis.
    pub kurtosis: f64,
    pub zero_crossing_rate: f64,
}

impl SpreadSummary {
    pub fn compute(spread: &[f64]) -> Self {
        let s = finite(spread);
        Self {
            mean: mean(&s),
            std: std_dev(&s),
            skew: skewness(&s),
            kurtosis: excess_kurtosis(&s),
            zero_crossing_rate: zero_crossing_rate(spread),
        }
    }
}

fn standardized_moment_sum(s: &[f64], power: i32) -> Option<f64> {
    let sd = std_dev(s);
    if !(sd > 0.0) {
        return None;
    }
    let m = mean(s);
    Some(s.iter().map(|v| ((v - m) / sd).powi(power)).sum())
}

fn skewness(s: &[f64]) -> f64 {
    let n = s.len() as f64;
    if s.len() < 3 {
        return f64::NAN;
    }
    match standardized_moment_sum(s, 3) {
        Some(sum) => n / ((n - 1.0) * (n - 2.0)) * sum,
        None => f64::NAN,
    }
}

fn excess_kurtosis(s: &[f64]) -> f64 {
    let n = s.len() as f64;
    if s.len() < 4 {
        return f64::NAN;
    }
    match standardized_moment_sum(s, 4) {
        Some(sum) => {
            n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0)) * sum
                - 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0))
        }
        None => f64::NAN,
    }
}

/// Fraction of observations whose sign differs from the previous one.
///
/// Missing values are dropped first; the first observation counts in the
/// denominator.
pub fn zero_crossing_rate(spread: &[f64]) -> f64 {
    let s = finite(spread);
    if s.is_empty() {
        return f64::NAN;
    }
    let crossings = s.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
    crossings as f64 / s.len() as f64
}

/// Fraction of observations more than `z_threshold` full-sample standard
/// deviations from the mean.
pub fn spike_ratio(spread: &[f64], z_threshold: f64) -> f64 {
    if spread.is_empty() {
        return f64::NAN;
    }
    let s = finite(spread);
    let (m, sd) = (mean(&s), std_dev(&s));
    if !(sd > 0.0) {
        return 0.0;
    }
    let spikes = spread
        .iter()
        .filter(|v| ((*v - m) / sd).abs() > z_threshold)
        .count();
    spikes as f64 / spread.len() as f64
}

/// Smoothness of a hedge-ratio path: standard deviation of its first
/// differences.
pub fn beta_stability(beta: &[f64]) -> f64 {
    std_dev(&finite(&diff(beta, 1)))
}
