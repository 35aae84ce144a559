//! Walk-forward regime classifier.
//!
//! At each `t >= min_window` the classifier looks at the trailing
//! `[t - min_window, t)` history of x, y and the spread, refreshes its
//! throttled heavy statistics (ADF, cointegration, Hurst) when due, always
//! recomputes correlation and half-life, scores the four dimensions, and
//! maps them to a [`RegimeLabel`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::cache::ThrottledStat;
use super::config::RegimeConfig;
use super::label::RegimeLabel;
use super::scores::{self, RegimeScores};
use crate::config::ConfigError;
use crate::engine::{Module, StepContext, StepRecord};
use crate::series::{names, StepData};
use crate::stats::{StandardStatistics, StatisticsProvider};

/// Raw statistic values behind one classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawStatistics {
    pub adf_p: f64,
    pub coint_p: f64,
    pub hurst: f64,
    pub half_life: f64,
    pub correlation: f64,
}

/// Output of one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeRecord {
    pub t: usize,
    pub label: RegimeLabel,
    pub position_multiplier: f64,
    pub scores: RegimeScores,
    pub raw: RawStatistics,
}

/// Regime classifier with cached, throttled heavy statistics.
pub struct RegimeClassifier<S: StatisticsProvider = StandardStatistics> {
    config: RegimeConfig,
    stats: S,
    adf_p: ThrottledStat,
    coint_p: ThrottledStat,
    hurst: ThrottledStat,
    last_regime: Option<RegimeLabel>,
}

impl RegimeClassifier<StandardStatistics> {
    pub fn new(config: RegimeConfig) -> Result<Self, ConfigError> {
        Self::with_provider(config, StandardStatistics)
    }
}

impl<S: StatisticsProvider> RegimeClassifier<S> {
    /// Classifier backed by a custom statistics provider.
    pub fn with_provider(config: RegimeConfig, stats: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            adf_p: ThrottledStat::new(config.adf_step),
            coint_p: ThrottledStat::new(config.coint_step),
            hurst: ThrottledStat::new(config.hurst_step),
            last_regime: None,
            config,
            stats,
        })
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    pub fn last_regime(&self) -> Option<RegimeLabel> {
        self.last_regime
    }

    pub fn adf_cache(&self) -> &ThrottledStat {
        &self.adf_p
    }

    pub fn coint_cache(&self) -> &ThrottledStat {
        &self.coint_p
    }

    pub fn hurst_cache(&self) -> &ThrottledStat {
        &self.hurst
    }

    /// Classify index `t` from the history strictly before it.
    ///
    /// `None` while `t < min_window` or when the inputs are shorter than `t`.
    pub fn evaluate(&mut self, t: usize, x: &[f64], y: &[f64], spread: &[f64]) -> Option<RegimeRecord> {
        let w = self.config.min_window;
        if t < w {
            return None;
        }
        let x_w = x.get(t - w..t)?;
        let y_w = y.get(t - w..t)?;
        let s_w = spread.get(t - w..t)?;

        let cfg = &self.config;
        let stats = &self.stats;

        let adf_p = self.adf_p.resolve(t, || {
            trace!(t, "recomputing ADF p-value");
            stats.stationarity_test(tail(s_w, cfg.adf_window)).p_value
        });
        let coint_p = self.coint_p.resolve(t, || {
            trace!(t, "recomputing cointegration p-value");
            stats
                .cointegration_test(tail(x_w, cfg.coint_window), tail(y_w, cfg.coint_window))
                .p_value
        });
        let hurst = self.hurst.resolve(t, || {
            trace!(t, "recomputing Hurst exponent");
            stats.hurst_exponent(tail(s_w, cfg.hurst_window), cfg.hurst_max_lag)
        });

        let correlation = stats.correlation(tail(x_w, cfg.corr_window), tail(y_w, cfg.corr_window));
        let half_life = stats.half_life(s_w);

        let scores = RegimeScores {
            structural: scores::structural(coint_p, adf_p),
            mean_reversion: scores::mean_reversion(half_life, hurst, cfg.hl_min, cfg.hl_max),
            coupling: scores::coupling(correlation),
            shock: scores::shock(s_w),
        };
        let label = scores::classify(&scores, cfg);

        if self.last_regime != Some(label) {
            debug!(t, from = ?self.last_regime, to = %label, "regime change");
        }
        self.last_regime = Some(label);

        Some(RegimeRecord {
            t,
            label,
            position_multiplier: label.position_multiplier(),
            scores,
            raw: RawStatistics {
                adf_p,
                coint_p,
                hurst,
                half_life,
                correlation,
            },
        })
    }
}

/// Trailing `n` values (the whole slice if shorter).
fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

impl<S: StatisticsProvider> Module for RegimeClassifier<S> {
    fn key(&self) -> &str {
        "regime"
    }

    fn required_series(&self) -> &[&'static str] {
        &[names::X, names::Y, names::SPREAD]
    }

    fn step(&mut self, t: usize, data: &StepData<'_>, _ctx: &StepContext) -> Option<StepRecord> {
        let x = data.series(names::X)?;
        let y = data.series(names::Y)?;
        let spread = data.series(names::SPREAD)?;
        self.evaluate(t, x, y, spread).map(StepRecord::Regime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::cointegrated_pair;

    fn small_config() -> RegimeConfig {
        RegimeConfig {
            min_window: 60,
            coint_window: 60,
            adf_window: 50,
            hurst_window: 50,
            corr_window: 40,
            ..Default::default()
        }
    }

    #[test]
    fn absent_before_min_window() {
        let pair = cointegrated_pair(100, 1.2, 0.05, 1);
        let mut clf = RegimeClassifier::new(small_config()).unwrap();
        for t in 0..60 {
            assert!(clf.evaluate(t, &pair.x, &pair.y, &pair.spread).is_none());
        }
        assert!(clf.last_regime().is_none());
        assert!(clf.evaluate(60, &pair.x, &pair.y, &pair.spread).is_some());
    }

    #[test]
    fn record_is_consistent_with_label() {
        let pair = cointegrated_pair(120, 1.2, 0.05, 2);
        let mut clf = RegimeClassifier::new(small_config()).unwrap();
        let rec = clf.evaluate(100, &pair.x, &pair.y, &pair.spread).unwrap();
        assert_eq!(rec.t, 100);
        assert_eq!(rec.position_multiplier, rec.label.position_multiplier());
        assert_eq!(clf.last_regime(), Some(rec.label));
        for s in [rec.scores.structural, rec.scores.mean_reversion, rec.scores.coupling, rec.scores.shock] {
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn ignores_data_from_t_onwards() {
        let pair = cointegrated_pair(120, 1.2, 0.05, 3);
        let mut a = RegimeClassifier::new(small_config()).unwrap();
        let mut b = RegimeClassifier::new(small_config()).unwrap();

        let mut spread = pair.spread.clone();
        spread[90..].iter_mut().for_each(|v| *v = 1e6);
        let ra = a.evaluate(90, &pair.x, &pair.y, &pair.spread).unwrap();
        let rb = b.evaluate(90, &pair.x, &pair.y, &spread).unwrap();
        assert_eq!(ra, rb);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = RegimeConfig {
            hurst_window: 500,
            ..Default::default()
        };
        assert!(RegimeClassifier::new(cfg).is_err());
    }
}
