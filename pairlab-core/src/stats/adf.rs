//! Augmented Dickey-Fuller and Engle-Granger cointegration tests.
//!
//! The lag order is chosen by AIC over a common sample (maximum lag
//! `ceil(12 * (n/100)^(1/4))`), then the regression is refit on the longest
//! sample that lag allows. P-values come from MacKinnon's (1994) response
//! surface approximation.

use statrs::function::erf::erfc;

use super::descriptive::{diff, std_dev};
use super::ols::{self, OlsFit};

/// Deterministic terms included in the test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// No constant (used on cointegration residuals).
    None,
    /// Constant only.
    Constant,
}

impl Trend {
    fn terms(self) -> usize {
        match self {
            Self::None => 0,
            Self::Constant => 1,
        }
    }
}

/// Raw ADF regression outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfOutcome {
    /// t-statistic of the lagged level coefficient.
    pub statistic: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// ADF statistic with AIC lag selection. `None` if the sample is too short
/// or the regression is degenerate.
pub fn adf_statistic(series: &[f64], trend: Trend) -> Option<AdfOutcome> {
    let n = series.len();
    if n < 6 || !(std_dev(series) > 0.0) {
        return None;
    }

    let auto = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lag = auto.min((n / 2).checked_sub(trend.terms() + 1)?);
    let dx = diff(series, 1);

    // Lag search on the common sample defined by max_lag.
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let Some(fit) = adf_regression(series, &dx, trend, lag, max_lag) else {
            continue;
        };
        let aic = fit.aic();
        if best.map_or(true, |(b, _)| aic < b) {
            best = Some((aic, lag));
        }
    }
    let (_, lag) = best?;

    let fit = adf_regression(series, &dx, trend, lag, lag)?;
    Some(AdfOutcome {
        statistic: fit.t_value(trend.terms()),
        used_lag: lag,
        nobs: fit.nobs,
    })
}

/// Regress `dx[i]` on `[const?, x[i], dx[i-1] .. dx[i-lag]]` for
/// `i in sample_lag..dx.len()`.
fn adf_regression(x: &[f64], dx: &[f64], trend: Trend, lag: usize, sample_lag: usize) -> Option<OlsFit> {
    let rows = dx.len().checked_sub(sample_lag)?;
    let ones = vec![1.0; rows];
    let level: Vec<f64> = (sample_lag..dx.len()).map(|i| x[i]).collect();
    let lags: Vec<Vec<f64>> = (1..=lag)
        .map(|l| (sample_lag..dx.len()).map(|i| dx[i - l]).collect())
        .collect();

    let mut columns: Vec<&[f64]> = Vec::with_capacity(lag + 2);
    if trend == Trend::Constant {
        columns.push(&ones);
    }
    columns.push(&level);
    columns.extend(lags.iter().map(Vec::as_slice));

    ols::fit_columns(&dx[sample_lag..], &columns)
}

/// MacKinnon approximate p-value for a Dickey-Fuller type statistic with a
/// constant in the test regression. `n_vars` is 1 for a univariate ADF test
/// and 2 for a two-variable Engle-Granger test.
pub fn mackinnon_p(statistic: f64, n_vars: usize) -> f64 {
    let table = match n_vars {
        1 => &MACKINNON_C[0],
        _ => &MACKINNON_C[1],
    };
    if statistic.is_nan() {
        return 1.0;
    }
    if statistic > table.max {
        return 1.0;
    }
    if statistic < table.min {
        return 0.0;
    }
    let value = if statistic <= table.star {
        polyval(&table.small_p, statistic)
    } else {
        polyval(&table.large_p, statistic)
    };
    normal_cdf(value)
}

struct MacKinnonTable {
    max: f64,
    min: f64,
    star: f64,
    small_p: [f64; 3],
    /// Large-p coefficients, already scaled by [1, 1e-1, 1e-1, 1e-2].
    large_p: [f64; 4],
}

const MACKINNON_C: [MacKinnonTable; 2] = [
    MacKinnonTable {
        max: 2.74,
        min: -18.83,
        star: -1.61,
        small_p: [2.1659, 1.4412, 0.038269],
        large_p: [1.7339, 0.93202, -0.12745, -0.010368],
    },
    MacKinnonTable {
        max: 0.92,
        min: -18.86,
        star: -2.62,
        small_p: [2.92, 1.5012, 0.039796],
        large_p: [2.1945, 0.64695, -0.29198, -0.042377],
    },
];

/// Evaluate `c0 + c1 x + c2 x^2 + ...`.
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Engle-Granger statistic: ADF (no constant) on the residuals of
/// `a ~ const + b`. Returns `-inf` for a (numerically) perfect fit.
pub fn engle_granger_statistic(a: &[f64], b: &[f64]) -> Option<AdfOutcome> {
    if a.len() != b.len() || a.len() < 6 {
        return None;
    }
    let ones = vec![1.0; a.len()];
    let fit = ols::fit_columns(a, &[&ones, b])?;

    if fit.r_squared(a) >= 1.0 - 100.0 * f64::EPSILON.sqrt() {
        return Some(AdfOutcome {
            statistic: f64::NEG_INFINITY,
            used_lag: 0,
            nobs: a.len(),
        });
    }

    adf_statistic(&fit.residuals, Trend::None)
}
