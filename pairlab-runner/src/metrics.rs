//! Performance metrics: pure functions over the execution log.
//!
//! Equity curve, position path, signal states and regime labels in, scalars
//! or aligned series out. No dependencies on the runner, data loading or engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pairlab_core::execution::ExecutionRecord;
use pairlab_core::regime::{RegimeLabel, RegimeRecord};
use pairlab_core::signal::{PositionState, SignalRecord};
use pairlab_core::stats::descriptive::{mean, std_dev};

use crate::config::MetricsConfig;

/// Aggregate performance of one pair run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub steps: usize,
    pub final_equity: f64,
    pub total_return: f64,
    /// Negative fraction, e.g. -0.15 for a 15% drawdown.
    pub max_drawdown: f64,
    pub sharpe: f64,
    pub volatility: f64,
    /// Signal entries from flat plus direction reversals. Regime resizing
    /// of an open position is not a trade.
    pub trade_count: usize,
    /// Mean absolute position.
    pub exposure: f64,
    pub total_turnover: f64,
    pub total_cost: f64,
    /// Steps per regime label. Unclassified steps are not counted.
    pub regime_counts: BTreeMap<String, usize>,
}

impl PerformanceSummary {
    pub fn compute(
        records: &[ExecutionRecord],
        regimes: &[Option<RegimeRecord>],
        signals: &[Option<SignalRecord>],
        periods_per_year: f64,
    ) -> Self {
        let equity: Vec<f64> = records.iter().map(|r| r.equity).collect();
        let positions: Vec<f64> = records.iter().map(|r| r.position).collect();
        let states: Vec<PositionState> = signals
            .iter()
            .map(|s| s.as_ref().map_or(PositionState::Flat, |s| s.raw_position))
            .collect();

        let mut regime_counts: BTreeMap<String, usize> = RegimeLabel::ALL
            .iter()
            .map(|l| (l.as_str().to_string(), 0))
            .collect();
        for record in regimes.iter().flatten() {
            *regime_counts.entry(record.label.as_str().to_string()).or_default() += 1;
        }

        Self {
            steps: records.len(),
            final_equity: equity.last().copied().unwrap_or(1.0),
            total_return: total_return(&equity),
            max_drawdown: max_drawdown(&equity),
            sharpe: sharpe_ratio(&equity, periods_per_year),
            volatility: volatility(&equity, periods_per_year),
            trade_count: trade_count(&states),
            exposure: if positions.is_empty() {
                0.0
            } else {
                positions.iter().map(|p| p.abs()).sum::<f64>() / positions.len() as f64
            },
            total_turnover: records.iter().map(|r| r.turnover).sum(),
            total_cost: records.iter().map(|r| r.cost).sum(),
            regime_counts,
        }
    }

    /// Share of classified steps labelled NORMAL.
    pub fn normal_fraction(&self) -> f64 {
        let classified: usize = self.regime_counts.values().sum();
        if classified == 0 {
            return 0.0;
        }
        let normal = self
            .regime_counts
            .get(RegimeLabel::Normal.as_str())
            .copied()
            .unwrap_or(0);
        normal as f64 / classified as f64
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Simple returns of an equity curve, with 0 at the first step.
pub fn returns(equity_curve: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(equity_curve.len());
    if equity_curve.is_empty() {
        return out;
    }
    out.push(0.0);
    out.extend(equity_curve.windows(2).map(|w| {
        if w[0] > 0.0 {
            (w[1] - w[0]) / w[0]
        } else {
            0.0
        }
    }));
    out
}

/// Total return as a fraction of the first equity value.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&first), Some(&last)) if first > 0.0 && equity_curve.len() >= 2 => (last - first) / first,
        _ => 0.0,
    }
}

/// Maximum drawdown as a negative fraction. 0 for monotone or constant
/// equity.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    drawdown(equity_curve).into_iter().fold(0.0, f64::min)
}

/// Drawdown from the running peak at every step.
pub fn drawdown(equity_curve: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity_curve
        .iter()
        .map(|&eq| {
            peak = peak.max(eq);
            if peak > 0.0 {
                eq / peak - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Annualized Sharpe ratio of the step returns (zero risk-free rate).
///
/// 0 when the returns have no dispersion or fewer than 2 steps exist.
pub fn sharpe_ratio(equity_curve: &[f64], periods_per_year: f64) -> f64 {
    let r = returns(equity_curve);
    let sd = std_dev(&r);
    if !(sd > 1e-15) {
        return 0.0;
    }
    mean(&r) / sd * periods_per_year.sqrt()
}

/// Annualized volatility of the step returns.
pub fn volatility(equity_curve: &[f64], periods_per_year: f64) -> f64 {
    let sd = std_dev(&returns(equity_curve));
    if sd.is_finite() {
        sd * periods_per_year.sqrt()
    } else {
        0.0
    }
}

/// Number of trades in a raw signal path: flat → long/short, or a direct
/// reversal.
pub fn trade_count(states: &[PositionState]) -> usize {
    let mut prev = PositionState::Flat;
    let mut count = 0;
    for &state in states {
        if state != prev && state != PositionState::Flat {
            count += 1;
        }
        prev = state;
    }
    count
}

// ─── Rolling metrics ────────────────────────────────────────────────

/// Step-aligned rolling performance series. Values are NaN until their
/// window is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingMetrics {
    pub windows: MetricsConfig,
    pub equity: Vec<f64>,
    pub returns: Vec<f64>,
    pub rolling_sharpe: Vec<f64>,
    pub rolling_volatility: Vec<f64>,
    pub drawdown: Vec<f64>,
    pub rolling_turnover: Vec<f64>,
    pub rolling_exposure: Vec<f64>,
    /// Share of NORMAL labels in the trailing window; unclassified steps
    /// count as not NORMAL.
    pub pct_normal: Vec<f64>,
}

impl RollingMetrics {
    pub fn compute(records: &[ExecutionRecord], regimes: &[Option<RegimeRecord>], windows: &MetricsConfig) -> Self {
        let equity: Vec<f64> = records.iter().map(|r| r.equity).collect();
        let positions: Vec<f64> = records.iter().map(|r| r.position).collect();
        let r = returns(&equity);
        let annual = windows.periods_per_year.sqrt();

        let rolling_sharpe = rolling(&r, windows.sharpe_window, |w| {
            let sd = std_dev(w);
            if sd > 0.0 {
                mean(w) / sd * annual
            } else {
                f64::NAN
            }
        });
        let rolling_volatility = rolling(&r, windows.vol_window, |w| std_dev(w) * annual);

        // The first position change is undefined.
        let changes: Vec<f64> = std::iter::once(f64::NAN)
            .chain(positions.windows(2).map(|w| (w[1] - w[0]).abs()))
            .take(positions.len())
            .collect();
        let rolling_turnover = rolling(&changes, windows.turnover_window, |w| w.iter().sum());

        let abs_pos: Vec<f64> = positions.iter().map(|p| p.abs()).collect();
        let rolling_exposure = rolling(&abs_pos, windows.exposure_window, mean);

        let normal: Vec<f64> = (0..records.len())
            .map(|i| match regimes.get(i) {
                Some(Some(rec)) if rec.label == RegimeLabel::Normal => 1.0,
                _ => 0.0,
            })
            .collect();
        let pct_normal = rolling(&normal, windows.regime_window, mean);

        Self {
            windows: *windows,
            drawdown: drawdown(&equity),
            equity,
            returns: r,
            rolling_sharpe,
            rolling_volatility,
            rolling_turnover,
            rolling_exposure,
            pct_normal,
        }
    }

    pub fn len(&self) -> usize {
        self.equity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equity.is_empty()
    }
}

/// Apply `f` to every complete trailing window `[i + 1 - window, i]`.
/// NaN where the window is incomplete or holds a NaN.
fn rolling(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return f64::NAN;
            }
            let w = &values[i + 1 - window..=i];
            if w.iter().any(|v| v.is_nan()) {
                f64::NAN
            } else {
                f(w)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn records(equity: &[f64], positions: &[f64]) -> Vec<ExecutionRecord> {
        equity
            .iter()
            .zip(positions)
            .enumerate()
            .map(|(t, (&e, &p))| ExecutionRecord {
                t,
                position: p,
                spread_return: 0.0,
                turnover: 0.0,
                cost: 0.0,
                pnl: 0.0,
                equity: e,
            })
            .collect()
    }

    #[test]
    fn total_return_and_drawdown() {
        let eq = [1.0, 1.2, 0.9, 1.1];
        assert_relative_eq!(total_return(&eq), 0.1, epsilon = 1e-12);
        assert_relative_eq!(max_drawdown(&eq), 0.9 / 1.2 - 1.0, epsilon = 1e-12);
        assert_eq!(max_drawdown(&[1.0, 1.1, 1.2]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
        assert_eq!(total_return(&[1.0]), 0.0);
    }

    #[test]
    fn constant_equity_has_zero_sharpe_and_volatility() {
        let eq = [1.0; 30];
        assert_eq!(sharpe_ratio(&eq, 252.0), 0.0);
        assert_eq!(volatility(&eq, 252.0), 0.0);
    }

    #[test]
    fn sharpe_of_known_returns() {
        let eq = [1.0, 1.01, 1.0, 1.02];
        let r = returns(&eq);
        let expected = mean(&r) / std_dev(&r) * 252.0_f64.sqrt();
        assert_relative_eq!(sharpe_ratio(&eq, 252.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn trade_count_counts_entries_and_reversals() {
        use PositionState::{Flat, Long, Short};
        assert_eq!(trade_count(&[Flat, Long, Long, Flat, Short, Long, Long, Flat]), 3);
        assert_eq!(trade_count(&[]), 0);
        assert_eq!(trade_count(&[Flat; 5]), 0);
    }

    fn signal(t: usize, raw: PositionState, regime: RegimeLabel) -> Option<SignalRecord> {
        let multiplier = regime.position_multiplier();
        Some(SignalRecord {
            t,
            signal: raw.as_f64() * multiplier,
            z: 0.0,
            position: raw.as_f64() * multiplier,
            raw_position: raw,
            regime: Some(regime),
            multiplier,
        })
    }

    #[test]
    fn regime_resizing_is_not_a_trade() {
        use PositionState::{Flat, Long};
        // Long held through RESET → NORMAL (sized 1 → 0 → 1) and a
        // DEGRADED → NORMAL resize.
        let signals = vec![
            signal(0, Flat, RegimeLabel::Normal),
            signal(1, Long, RegimeLabel::Normal),
            signal(2, Long, RegimeLabel::Reset),
            signal(3, Long, RegimeLabel::Normal),
            signal(4, Long, RegimeLabel::Degraded),
            signal(5, Long, RegimeLabel::Normal),
            signal(6, Flat, RegimeLabel::Normal),
        ];
        let positions: Vec<f64> = signals.iter().flatten().map(|s| s.position).collect();
        let recs = records(&[1.0; 7], &positions);
        let summary = PerformanceSummary::compute(&recs, &[], &signals, 252.0);
        assert_eq!(summary.trade_count, 1);
    }

    #[test]
    fn missing_signal_records_count_as_flat() {
        let signals = vec![None, signal(1, PositionState::Short, RegimeLabel::Normal), None];
        let recs = records(&[1.0; 3], &[0.0, -1.0, 0.0]);
        let summary = PerformanceSummary::compute(&recs, &[], &signals, 252.0);
        assert_eq!(summary.trade_count, 1);
    }

    #[test]
    fn summary_counts_regimes() {
        let recs = records(&[1.0, 1.0, 1.0], &[0.0, 0.0, 0.0]);
        let summary = PerformanceSummary::compute(&recs, &[None, None, None], &[None, None, None], 252.0);
        assert_eq!(summary.final_equity, 1.0);
        assert_eq!(summary.trade_count, 0);
        assert_eq!(summary.regime_counts.len(), 4);
        assert!(summary.regime_counts.values().all(|&c| c == 0));
        assert_eq!(summary.normal_fraction(), 0.0);
    }

    #[test]
    fn rolling_series_are_nan_until_window_complete() {
        let windows = MetricsConfig {
            sharpe_window: 3,
            vol_window: 3,
            turnover_window: 2,
            exposure_window: 2,
            regime_window: 2,
            ..Default::default()
        };
        let recs = records(&[1.0, 1.1, 1.0, 1.2, 1.1], &[0.0, 1.0, 1.0, -1.0, 0.0]);
        let m = RollingMetrics::compute(&recs, &[], &windows);

        assert_eq!(m.len(), 5);
        assert!(m.rolling_sharpe[1].is_nan());
        assert!(m.rolling_sharpe[2].is_finite());
        // changes: [NaN, 1, 0, 2, 1]
        assert!(m.rolling_turnover[1].is_nan());
        assert_eq!(m.rolling_turnover[2], 1.0);
        assert_eq!(m.rolling_turnover[4], 3.0);
        assert!(m.rolling_exposure[0].is_nan());
        assert_eq!(m.rolling_exposure[1], 0.5);
        assert_eq!(m.pct_normal[4], 0.0);
        assert_eq!(m.returns[0], 0.0);
        assert_relative_eq!(m.drawdown[2], 1.0 / 1.1 - 1.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn drawdown_is_bounded_for_positive_equity(
            equity in prop::collection::vec(0.01f64..10.0, 1..200)
        ) {
            let dd = drawdown(&equity);
            prop_assert_eq!(dd.len(), equity.len());
            prop_assert!(dd.iter().all(|&d| (-1.0..=0.0).contains(&d)));
            let worst = max_drawdown(&equity);
            prop_assert!(dd.iter().all(|&d| d >= worst));
        }

        #[test]
        fn trade_count_never_exceeds_state_changes(
            raw in prop::collection::vec(-1i8..=1, 0..100)
        ) {
            let states: Vec<PositionState> = raw
                .iter()
                .map(|&v| match v {
                    -1 => PositionState::Short,
                    1 => PositionState::Long,
                    _ => PositionState::Flat,
                })
                .collect();
            let changes = states.windows(2).filter(|w| w[0] != w[1]).count()
                + usize::from(states.first().is_some_and(|&s| s != PositionState::Flat));
            prop_assert!(trade_count(&states) <= changes);
        }
    }
}
