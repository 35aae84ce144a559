//! Mean-reversion measures: half-life, Hurst exponent, variance ratio.
//!
//! All three drop missing observations first.

use super::descriptive::{diff, finite, std_dev, variance};
use super::ols;

/// Half-life of mean reversion from the regression
/// `Δs[t] = a + b·s[t-1]`, as `-ln 2 / b`.
///
/// `+inf` when `b >= 0` (not mean-reverting) or the regression is
/// degenerate.
pub fn half_life(series: &[f64]) -> f64 {
    let s = finite(series);
    if s.len() < 3 {
        return f64::INFINITY;
    }
    let lagged = &s[..s.len() - 1];
    let delta = diff(&s, 1);
    let ones = vec![1.0; delta.len()];

    let Some(fit) = ols::fit_columns(&delta, &[&ones, lagged]) else {
        return f64::INFINITY;
    };
    let slope = fit.coefficients[1];
    if !(slope < 0.0) {
        return f64::INFINITY;
    }
    -std::f64::consts::LN_2 / slope
}

/// Hurst exponent from the scaling of lagged-difference dispersion.
///
/// For lags `2..max_lag`, `tau(lag) = sqrt(std(x[t+lag] - x[t]))`; the
/// exponent is twice the slope of `ln tau` on `ln lag`. NaN when fewer than
/// two lags have a positive dispersion.
pub fn hurst_exponent(series: &[f64], max_lag: usize) -> f64 {
    let s = finite(series);
    let mut log_lags = Vec::new();
    let mut log_tau = Vec::new();
    for lag in 2..max_lag {
        let sd = std_dev(&diff(&s, lag));
        if !(sd > 0.0) {
            return f64::NAN;
        }
        log_lags.push((lag as f64).ln());
        log_tau.push(sd.sqrt().ln());
    }
    if log_lags.len() < 2 {
        return f64::NAN;
    }
    let ones = vec![1.0; log_lags.len()];
    let Some(fit) = fit_line(&log_tau, &ones, &log_lags) else {
        return f64::NAN;
    };
    2.0 * fit
}

fn fit_line(target: &[f64], ones: &[f64], x: &[f64]) -> Option<f64> {
    // Two points fit exactly; OLS needs n > k, so solve those directly.
    if target.len() == 2 {
        let dx = x[1] - x[0];
        return (dx != 0.0).then(|| (target[1] - target[0]) / dx);
    }
    ols::fit_columns(target, &[ones, x]).map(|f| f.coefficients[1])
}

/// Lo-MacKinlay style variance ratio: `Var(x[t+lag] - x[t]) / lag` over
/// `Var(x[t+1] - x[t])`. Near 1 for a random walk, below 1 when
/// mean-reverting.
pub fn variance_ratio(series: &[f64], lag: usize) -> f64 {
    let s = finite(series);
    let var_1 = variance(&diff(&s, 1));
    let var_k = variance(&diff(&s, lag)) / lag as f64;
    if !(var_1 > 0.0) {
        return f64::NAN;
    }
    var_k / var_1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn ar1(n: usize, phi: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut v = 0.0;
        (0..n)
            .map(|_| {
                v = phi * v + rng.gen_range(-1.0..1.0);
                v
            })
            .collect()
    }

    #[test]
    fn half_life_of_deterministic_decay() {
        // s[t] = 0.5^t * 100 plus a constant: delta = -0.5 * (s - c)
        let s: Vec<f64> = (0..30).map(|t| 10.0 + 100.0 * 0.5_f64.powi(t)).collect();
        assert_relative_eq!(half_life(&s), 2.0_f64.ln() / 0.5, epsilon = 1e-6);
    }

    #[test]
    fn half_life_of_trend_is_infinite() {
        let s: Vec<f64> = (0..50).map(|t| (t as f64).powi(2)).collect();
        assert!(half_life(&s).is_infinite());
    }

    #[test]
    fn half_life_of_constant_or_short_is_infinite() {
        assert!(half_life(&[1.0; 20]).is_infinite());
        assert!(half_life(&[1.0, 2.0]).is_infinite());
    }

    #[test]
    fn half_life_of_ar1_is_plausible() {
        let hl = half_life(&ar1(2000, 0.9, 1));
        // theoretical -ln2 / ln(0.9) ≈ 6.6
        assert!(hl > 4.0 && hl < 10.0, "hl = {hl}");
    }

    #[test]
    fn hurst_separates_mean_reverting_from_random_walk() {
        let mr = hurst_exponent(&ar1(1000, 0.0, 2), 20);
        let rw = hurst_exponent(&ar1(1000, 1.0, 3), 20);
        assert!(mr < 0.3, "mr hurst = {mr}");
        assert!(rw > 0.35, "rw hurst = {rw}");
        assert!(rw > mr);
    }

    #[test]
    fn hurst_of_constant_is_nan() {
        assert!(hurst_exponent(&[5.0; 100], 20).is_nan());
        assert!(hurst_exponent(&[1.0, 2.0, 3.0], 3).is_nan());
    }

    #[test]
    fn variance_ratio_below_one_for_noise() {
        let vr = variance_ratio(&ar1(1000, 0.0, 4), 2);
        assert!(vr < 0.8, "vr = {vr}");
        assert!(variance_ratio(&[2.0; 10], 2).is_nan());
    }
}
