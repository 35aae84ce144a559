//! Z-score signal with entry/exit hysteresis.
//!
//! A three-state machine (short / flat / long) driven by the z-score of the
//! current spread against the trailing `[t - window, t)` window. Entries need
//! `|z| > entry_z`; exits happen once z has reverted inside `exit_z`. The raw
//! position is scaled by the current regime's multiplier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ensure_at_least, ensure_finite, ConfigError};
use crate::engine::{Module, StepContext, StepRecord};
use crate::regime::{RegimeLabel, RegimeRecord};
use crate::series::{names, StepData};
use crate::stats::descriptive::{finite, zscore_against};

/// Signal parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Trailing window for the z-score mean and standard deviation.
    pub window: usize,
    pub entry_z: f64,
    pub exit_z: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            window: 20,
            entry_z: 2.0,
            exit_z: 0.5,
        }
    }
}

impl SignalConfig {
    /// Requires `0 <= exit_z < entry_z`; otherwise the hysteresis band
    /// collapses or inverts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_at_least("signal.window", self.window, 2)?;
        ensure_finite("signal.entry_z", self.entry_z)?;
        ensure_finite("signal.exit_z", self.exit_z)?;
        if !(0.0 <= self.exit_z && self.exit_z < self.entry_z) {
            return Err(ConfigError::Invalid(format!(
                "signal thresholds must satisfy 0 <= exit_z < entry_z, got exit_z = {}, entry_z = {}",
                self.exit_z, self.entry_z
            )));
        }
        Ok(())
    }
}

/// Raw position state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum PositionState {
    Short,
    #[default]
    Flat,
    Long,
}

impl PositionState {
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Short => -1,
            Self::Flat => 0,
            Self::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i8())
    }

    /// Hysteresis transition. Never jumps directly between long and short.
    pub fn next(self, z: f64, entry_z: f64, exit_z: f64) -> Self {
        match self {
            Self::Flat if z > entry_z => Self::Short,
            Self::Flat if z < -entry_z => Self::Long,
            Self::Long if z > -exit_z => Self::Flat,
            Self::Short if z < exit_z => Self::Flat,
            state => state,
        }
    }
}

impl From<PositionState> for i8 {
    fn from(state: PositionState) -> Self {
        state.as_i8()
    }
}

impl TryFrom<i8> for PositionState {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Short),
            0 => Ok(Self::Flat),
            1 => Ok(Self::Long),
            other => Err(format!("invalid position state {other}, expected -1, 0 or 1")),
        }
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Output of one signal step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub t: usize,
    /// Sized target position (same as `position`).
    pub signal: f64,
    /// NaN during warm-up, 0 when the window has no dispersion.
    pub z: f64,
    /// `raw_position × multiplier`, in `[-1, 1]`.
    pub position: f64,
    pub raw_position: PositionState,
    pub regime: Option<RegimeLabel>,
    pub multiplier: f64,
}

/// Z-score position state machine.
#[derive(Debug, Clone)]
pub struct ZScoreSignal {
    config: SignalConfig,
    state: PositionState,
}

impl ZScoreSignal {
    pub fn new(config: SignalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: PositionState::Flat,
        })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    /// Advance to index `t`. Reads `spread[..=t]` only.
    pub fn evaluate(&mut self, t: usize, spread: &[f64], regime: Option<&RegimeRecord>) -> SignalRecord {
        let (label, multiplier) = match regime {
            Some(r) => (Some(r.label), r.position_multiplier),
            None => (None, 1.0),
        };
        let flat = |z: f64| SignalRecord {
            t,
            signal: 0.0,
            z,
            position: 0.0,
            raw_position: PositionState::Flat,
            regime: label,
            multiplier,
        };

        let w = self.config.window;
        let (Some(history), Some(&current)) = (t.checked_sub(w).and_then(|s| spread.get(s..t)), spread.get(t))
        else {
            return flat(f64::NAN);
        };

        let Some(z) = zscore_against(&finite(history), current) else {
            return flat(0.0);
        };

        self.state = self.state.next(z, self.config.entry_z, self.config.exit_z);
        let sized = self.state.as_f64() * multiplier;

        SignalRecord {
            t,
            signal: sized,
            z,
            position: sized,
            raw_position: self.state,
            regime: label,
            multiplier,
        }
    }
}

impl Module for ZScoreSignal {
    fn key(&self) -> &str {
        "signal"
    }

    fn required_series(&self) -> &[&'static str] {
        &[names::SPREAD]
    }

    fn step(&mut self, t: usize, data: &StepData<'_>, ctx: &StepContext) -> Option<StepRecord> {
        let spread = data.series(names::SPREAD)?;
        Some(StepRecord::Signal(self.evaluate(t, spread, ctx.regime())))
    }
}
