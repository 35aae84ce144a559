//! Statistics provider.
//!
//! The regime classifier and the diagnostics call statistics only through
//! [`StatisticsProvider`], so tests can substitute an instrumented provider.
//! [`StandardStatistics`] is the production implementation built on the
//! free functions in the submodules.

pub mod adf;
pub mod descriptive;
pub mod mean_reversion;
pub mod ols;

use serde::{Deserialize, Serialize};

use adf::Trend;

/// Significance level behind `is_stationary` / `is_cointegrated`.
pub const SIGNIFICANCE: f64 = 0.05;

/// Outcome of an augmented Dickey-Fuller test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationarityTest {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
    pub is_stationary: bool,
}

impl StationarityTest {
    /// Result for inputs the test cannot be run on.
    pub fn degenerate() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: 1.0,
            used_lag: 0,
            nobs: 0,
            is_stationary: false,
        }
    }
}

/// Outcome of an Engle-Granger cointegration test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CointegrationTest {
    pub statistic: f64,
    pub p_value: f64,
    pub is_cointegrated: bool,
}

impl CointegrationTest {
    pub fn degenerate() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: 1.0,
            is_cointegrated: false,
        }
    }
}

/// Stateless statistics consumed by the regime classifier and diagnostics.
pub trait StatisticsProvider: Send + Sync {
    /// Pearson correlation over pairwise-finite observations.
    fn correlation(&self, a: &[f64], b: &[f64]) -> f64;

    /// ADF test with a constant and AIC lag selection.
    fn stationarity_test(&self, series: &[f64]) -> StationarityTest;

    /// Engle-Granger test of `a` on `b`.
    fn cointegration_test(&self, a: &[f64], b: &[f64]) -> CointegrationTest;

    /// `+inf` when the series is not mean-reverting.
    fn half_life(&self, series: &[f64]) -> f64;

    fn hurst_exponent(&self, series: &[f64], max_lag: usize) -> f64;

    fn variance_ratio(&self, series: &[f64], lag: usize) -> f64;
}

/// Production statistics provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardStatistics;

impl StatisticsProvider for StandardStatistics {
    fn correlation(&self, a: &[f64], b: &[f64]) -> f64 {
        descriptive::correlation(a, b)
    }

    fn stationarity_test(&self, series: &[f64]) -> StationarityTest {
        let clean = descriptive::finite(series);
        match adf::adf_statistic(&clean, Trend::Constant) {
            Some(out) => {
                let p_value = adf::mackinnon_p(out.statistic, 1);
                StationarityTest {
                    statistic: out.statistic,
                    p_value,
                    used_lag: out.used_lag,
                    nobs: out.nobs,
                    is_stationary: p_value < SIGNIFICANCE,
                }
            }
            None => StationarityTest::degenerate(),
        }
    }

    fn cointegration_test(&self, a: &[f64], b: &[f64]) -> CointegrationTest {
        let (a, b) = descriptive::pairwise_finite(a, b);
        match adf::engle_granger_statistic(&a, &b) {
            Some(out) => {
                let p_value = adf::mackinnon_p(out.statistic, 2);
                CointegrationTest {
                    statistic: out.statistic,
                    p_value,
                    is_cointegrated: p_value < SIGNIFICANCE,
                }
            }
            None => CointegrationTest::degenerate(),
        }
    }

    fn half_life(&self, series: &[f64]) -> f64 {
        mean_reversion::half_life(series)
    }

    fn hurst_exponent(&self, series: &[f64], max_lag: usize) -> f64 {
        mean_reversion::hurst_exponent(series, max_lag)
    }

    fn variance_ratio(&self, series: &[f64], lag: usize) -> f64 {
        mean_reversion::variance_ratio(series, lag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_inputs_are_not_significant() {
        let stats = StandardStatistics;
        let adf = stats.stationarity_test(&[1.0; 40]);
        assert_eq!(adf.p_value, 1.0);
        assert!(!adf.is_stationary);
        assert!(adf.statistic.is_nan());

        let coint = stats.cointegration_test(&[1.0, 2.0], &[1.0, 2.0]);
        assert_eq!(coint.p_value, 1.0);
        assert!(!coint.is_cointegrated);
    }

    #[test]
    fn stationarity_ignores_missing_values() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(9);
        let mut series: Vec<f64> = (0..120).map(|_| rng.gen_range(-1.0..1.0)).collect();
        series[10] = f64::NAN;
        let out = StandardStatistics.stationarity_test(&series);
        assert!(out.p_value.is_finite());
        assert!(out.is_stationary);
    }
}
