//! Spread PnL accountant.
//!
//! Holds the previous step's sized position over the spread's period return,
//! charges turnover-proportional cost when the position changes, and
//! compounds equity once per step.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::log::ExecutionLog;
use crate::config::{ensure_non_negative, ConfigError};
use crate::engine::{Module, StepContext, StepRecord};
use crate::series::{names, StepData};
use crate::signal::SignalRecord;

/// Smallest per-step equity growth factor. A step whose loss would take
/// equity to zero or below is floored here so equity stays positive.
pub const MIN_GROWTH_FACTOR: f64 = 1e-6;

/// Trading cost parameters, per unit of turnover.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub cost_per_turnover: f64,
    pub slippage: f64,
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("execution.cost_per_turnover", self.cost_per_turnover)?;
        ensure_non_negative("execution.slippage", self.slippage)
    }

    /// Total charge per unit of turnover.
    pub fn unit_cost(&self) -> f64 {
        self.cost_per_turnover + self.slippage
    }
}

/// One accounting step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub t: usize,
    /// Position taken at `t` (held over the next period).
    pub position: f64,
    pub spread_return: f64,
    pub turnover: f64,
    pub cost: f64,
    pub pnl: f64,
    pub equity: f64,
}

/// Append-only spread accountant.
#[derive(Debug, Clone)]
pub struct SpreadAccountant {
    config: ExecutionConfig,
    prev_position: f64,
    equity: f64,
    records: Vec<ExecutionRecord>,
}

impl SpreadAccountant {
    pub fn new(config: ExecutionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            prev_position: 0.0,
            equity: 1.0,
            records: Vec::new(),
        })
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn prev_position(&self) -> f64 {
        self.prev_position
    }

    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    /// Account for index `t`. Reads `spread[t - 1..=t]` only.
    ///
    /// With no signal, or at `t == 0`, logs a zero record and leaves both
    /// equity and the held position unchanged.
    pub fn evaluate(&mut self, t: usize, spread: &[f64], signal: Option<&SignalRecord>) -> ExecutionRecord {
        let (Some(signal), Some(prev_t)) = (signal, t.checked_sub(1)) else {
            let record = self.empty_record(t);
            return self.push(record);
        };

        let position = signal.position;
        let spread_return = match (spread.get(t), spread.get(prev_t)) {
            (Some(now), Some(before)) if (now - before).is_finite() => now - before,
            _ => 0.0,
        };

        let turnover = (position - self.prev_position).abs();
        let cost = turnover * self.config.unit_cost();
        let pnl = self.prev_position * spread_return - cost;

        let mut growth = 1.0 + pnl;
        if growth < MIN_GROWTH_FACTOR {
            warn!(t, pnl, equity = self.equity, "step loss exceeds equity, flooring growth factor");
            growth = MIN_GROWTH_FACTOR;
        }
        self.equity *= growth;
        self.prev_position = position;

        self.push(ExecutionRecord {
            t,
            position,
            spread_return,
            turnover,
            cost,
            pnl,
            equity: self.equity,
        })
    }

    fn empty_record(&self, t: usize) -> ExecutionRecord {
        ExecutionRecord {
            t,
            position: 0.0,
            spread_return: 0.0,
            turnover: 0.0,
            cost: 0.0,
            pnl: 0.0,
            equity: self.equity,
        }
    }

    fn push(&mut self, record: ExecutionRecord) -> ExecutionRecord {
        self.records.push(record);
        record
    }

    /// The full ordered log. Dates are attached only when they match the
    /// number of logged steps.
    pub fn finalize(&self, dates: Option<&[NaiveDate]>) -> ExecutionLog {
        let dates = dates
            .filter(|d| d.len() == self.records.len())
            .map(<[NaiveDate]>::to_vec);
        ExecutionLog::new(self.records.clone(), dates)
    }
}

impl Module for SpreadAccountant {
    fn key(&self) -> &str {
        "execution"
    }

    fn required_series(&self) -> &[&'static str] {
        &[names::SPREAD]
    }

    fn step(&mut self, t: usize, data: &StepData<'_>, ctx: &StepContext) -> Option<StepRecord> {
        let spread = data.series(names::SPREAD)?;
        Some(StepRecord::Execution(self.evaluate(t, spread, ctx.signal())))
    }
}
