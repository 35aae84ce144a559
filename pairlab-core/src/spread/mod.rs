//! Spread construction: `spread = x - beta * y`.

pub mod diagnostics;

use crate::stats::descriptive::{mean, std_dev};

/// Spread with a time-varying hedge ratio. NaN wherever any input is NaN.
pub fn build(x: &[f64], y: &[f64], beta: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(y)
        .zip(beta)
        .map(|((x, y), b)| x - b * y)
        .collect()
}

/// Spread with a constant hedge ratio.
pub fn build_static(x: &[f64], y: &[f64], beta: f64) -> Vec<f64> {
    x.iter().zip(y).map(|(x, y)| x - beta * y).collect()
}

/// Rolling z-score over the window ending at (and including) `t`.
///
/// NaN until `window` observations are available, when the window holds a
/// missing value, or when its standard deviation is zero.
pub fn normalize(spread: &[f64], window: usize) -> Vec<f64> {
    (0..spread.len())
        .map(|t| {
            if window < 2 || t + 1 < window {
                return f64::NAN;
            }
            let w = &spread[t + 1 - window..=t];
            if w.iter().any(|v| v.is_nan()) {
                return f64::NAN;
            }
            let sd = std_dev(w);
            if sd > 0.0 {
                (spread[t] - mean(w)) / sd
            } else {
                f64::NAN
            }
        })
        .collect()
}
