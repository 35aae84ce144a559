//! Rolling stability of the spread's statistical properties.
//!
//! Each component is the fraction of rolling windows in which a property
//! holds; the stability score is their weighted sum.

use serde::{Deserialize, Serialize};

use crate::config::{ensure_at_least, ConfigError};
use crate::stats::{StatisticsProvider, SIGNIFICANCE};

/// Windows and steps of the rolling checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub coint_window: usize,
    pub coint_step: usize,
    pub adf_window: usize,
    pub adf_step: usize,
    pub hl_window: usize,
    pub hl_min: f64,
    pub hl_max: f64,
    pub hurst_window: usize,
    pub hurst_threshold: f64,
    pub hurst_max_lag: usize,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            coint_window: 180,
            coint_step: 10,
            adf_window: 90,
            adf_step: 5,
            hl_window: 60,
            hl_min: 2.0,
            hl_max: 80.0,
            hurst_window: 100,
            hurst_threshold: 0.5,
            hurst_max_lag: 20,
        }
    }
}

impl StabilityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_at_least("stability.coint_window", self.coint_window, 2)?;
        ensure_at_least("stability.coint_step", self.coint_step, 1)?;
        ensure_at_least("stability.adf_window", self.adf_window, 2)?;
        ensure_at_least("stability.adf_step", self.adf_step, 1)?;
        ensure_at_least("stability.hl_window", self.hl_window, 2)?;
        ensure_at_least("stability.hurst_window", self.hurst_window, 2)?;
        Ok(())
    }
}

pub const WEIGHT_COINT: f64 = 0.35;
pub const WEIGHT_ADF: f64 = 0.30;
pub const WEIGHT_HALF_LIFE: f64 = 0.20;
pub const WEIGHT_HURST: f64 = 0.15;

/// Pass fractions and the weighted stability score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadStability {
    pub coint: f64,
    pub adf: f64,
    pub half_life: f64,
    pub hurst: f64,
    pub score: f64,
}

impl SpreadStability {
    pub fn compute<S: StatisticsProvider + ?Sized>(
        stats: &S,
        config: &StabilityConfig,
        x: &[f64],
        y: &[f64],
        spread: &[f64],
    ) -> Self {
        let coint = rolling_coint(stats, x, y, config.coint_window, config.coint_step);
        let adf = rolling_adf(stats, spread, config.adf_window, config.adf_step);
        let half_life = rolling_half_life(stats, spread, config.hl_window, config.hl_min, config.hl_max);
        let hurst = rolling_hurst(
            stats,
            spread,
            config.hurst_window,
            config.hurst_threshold,
            config.hurst_max_lag,
        );
        Self {
            coint,
            adf,
            half_life,
            hurst,
            score: WEIGHT_COINT * coint + WEIGHT_ADF * adf + WEIGHT_HALF_LIFE * half_life + WEIGHT_HURST * hurst,
        }
    }
}

/// Fraction of windows `[i - window, i)`, `i = window, window + step, ..`,
/// for which `check` holds. Zero when no window fits.
fn pass_fraction(len: usize, window: usize, step: usize, mut check: impl FnMut(usize, usize) -> bool) -> f64 {
    if window == 0 || len <= window {
        return 0.0;
    }
    let (passed, total) = (window..len)
        .step_by(step.max(1))
        .fold((0usize, 0usize), |(p, n), i| (p + usize::from(check(i - window, i)), n + 1));
    passed as f64 / total as f64
}

pub fn rolling_coint<S: StatisticsProvider + ?Sized>(stats: &S, x: &[f64], y: &[f64], window: usize, step: usize) -> f64 {
    let len = x.len().min(y.len());
    pass_fraction(len, window, step, |a, b| {
        stats.cointegration_test(&x[a..b], &y[a..b]).p_value < SIGNIFICANCE
    })
}

pub fn rolling_adf<S: StatisticsProvider + ?Sized>(stats: &S, spread: &[f64], window: usize, step: usize) -> f64 {
    pass_fraction(spread.len(), window, step, |a, b| {
        stats.stationarity_test(&spread[a..b]).p_value < SIGNIFICANCE
    })
}

pub fn rolling_half_life<S: StatisticsProvider + ?Sized>(
    stats: &S,
    spread: &[f64],
    window: usize,
    hl_min: f64,
    hl_max: f64,
) -> f64 {
    pass_fraction(spread.len(), window, 1, |a, b| {
        (hl_min..=hl_max).contains(&stats.half_life(&spread[a..b]))
    })
}

pub fn rolling_hurst<S: StatisticsProvider + ?Sized>(
    stats: &S,
    spread: &[f64],
    window: usize,
    threshold: f64,
    max_lag: usize,
) -> f64 {
    pass_fraction(spread.len(), window, 1, |a, b| {
        stats.hurst_exponent(&spread[a..b], max_lag) < threshold
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StandardStatistics;
    use crate::synthetic::cointegrated_pair;

    #[test]
    fn pass_fraction_counts_windows() {
        // windows end at 3, 5, 7, 9
        let f = pass_fraction(10, 3, 2, |_, end| end >= 7);
        assert_eq!(f, 0.5);
        assert_eq!(pass_fraction(3, 3, 1, |_, _| true), 0.0);
    }

    #[test]
    fn stationary_spread_is_stable() {
        let pair = cointegrated_pair(400, 1.2, 0.1, 11);
        let stab = SpreadStability::compute(&StandardStatistics, &StabilityConfig::default(), &pair.x, &pair.y, &pair.spread);
        assert!(stab.adf > 0.9, "adf {}", stab.adf);
        assert!(stab.coint > 0.9, "coint {}", stab.coint);
        assert!(stab.hurst > 0.9, "hurst {}", stab.hurst);
        assert!((0.0..=1.0).contains(&stab.score));
    }

    #[test]
    fn short_series_scores_zero() {
        let s = [1.0, 2.0, 3.0];
        let stab = SpreadStability::compute(&StandardStatistics, &StabilityConfig::default(), &s, &s, &s);
        assert_eq!(stab.score, 0.0);
    }
}
