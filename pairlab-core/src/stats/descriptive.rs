//! Descriptive statistics over finite samples.
//!
//! Thin wrappers over `statrs` that define the NaN policy once: missing
//! observations are dropped (pairwise for two-sample statistics) and
//! degenerate inputs yield NaN rather than panicking.

use statrs::statistics::Statistics;

/// Finite values of `values`, in order.
pub fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Pairs where both sides are finite.
pub fn pairwise_finite(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .unzip()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().mean()
}

/// Sample standard deviation (n - 1 denominator). NaN for fewer than 2 values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    values.iter().std_dev()
}

/// Sample variance (n - 1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    values.iter().variance()
}

/// Pearson correlation over pairwise-finite observations.
///
/// NaN when fewer than two pairs remain or either side has zero variance.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let (a, b) = pairwise_finite(a, b);
    if a.len() < 2 {
        return f64::NAN;
    }
    let sa = a.iter().std_dev();
    let sb = b.iter().std_dev();
    if sa == 0.0 || sb == 0.0 {
        return f64::NAN;
    }
    a.iter().covariance(b.iter()) / (sa * sb)
}

/// Standardized value of `value` against the sample `window`.
///
/// Returns `None` when the window's standard deviation is zero or undefined.
pub fn zscore_against(window: &[f64], value: f64) -> Option<f64> {
    let sd = std_dev(window);
    if !sd.is_finite() || sd == 0.0 {
        return None;
    }
    Some((value - mean(window)) / sd)
}

/// Lag-`lag` differences: `values[i + lag] - values[i]`.
pub fn diff(values: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 || values.len() <= lag {
        return Vec::new();
    }
    values[lag..]
        .iter()
        .zip(values)
        .map(|(later, earlier)| later - earlier)
        .collect()
}
