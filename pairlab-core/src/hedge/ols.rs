//! Least-squares hedge ratios: static (full sample) and rolling (trailing
//! window, walk-forward safe).

use crate::stats::descriptive::pairwise_finite;
use crate::stats::ols;

/// Static hedge ratio of `x = beta * y + e` (no intercept) over the
/// pairwise-finite observations. NaN if degenerate.
pub fn ols_hedge_ratio(x: &[f64], y: &[f64]) -> f64 {
    let (x, y) = pairwise_finite(x, y);
    ols::fit_columns(&x, &[&y])
        .map(|fit| fit.coefficients[0])
        .unwrap_or(f64::NAN)
}

/// Rolling hedge ratio: the value at `t` is fitted on `[t - window, t)`, so
/// it never uses the observation at `t` itself. NaN for `t < window`.
pub fn rolling_ols(x: &[f64], y: &[f64], window: usize) -> Vec<f64> {
    let n = x.len().min(y.len());
    (0..n)
        .map(|t| {
            if window == 0 || t < window {
                f64::NAN
            } else {
                ols_hedge_ratio(&x[t - window..t], &y[t - window..t])
            }
        })
        .collect()
}

/// Bound a hedge ratio to `[lower, upper]`. NaN passes through.
pub fn clip_beta(beta: f64, lower: f64, upper: f64) -> f64 {
    if beta.is_nan() {
        return beta;
    }
    beta.max(lower).min(upper)
}
