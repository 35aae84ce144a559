//! Tradability gate: a pair is tradable only if every check passes.

use serde::{Deserialize, Serialize};

use super::score::SpreadScore;
use super::stability::SpreadStability;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub max_adf_p: f64,
    pub hl_min: f64,
    pub hl_max: f64,
    /// Hurst must be strictly below this.
    pub max_hurst: f64,
    pub min_stability: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_adf_p: 0.05,
            hl_min: 5.0,
            hl_max: 120.0,
            max_hurst: 0.5,
            min_stability: 0.6,
        }
    }
}

/// Outcome of the gate with the first failing check, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub tradable: bool,
    pub reason: Option<String>,
}

impl GateConfig {
    /// NaN inputs fail their check.
    pub fn evaluate(&self, adf_p: f64, half_life: f64, hurst: f64, stability: f64) -> GateVerdict {
        let reason = if !(adf_p <= self.max_adf_p) {
            Some(format!("ADF p-value {adf_p:.4} above {}", self.max_adf_p))
        } else if !(self.hl_min..=self.hl_max).contains(&half_life) {
            Some(format!(
                "half-life {half_life:.2} outside [{}, {}]",
                self.hl_min, self.hl_max
            ))
        } else if !(hurst < self.max_hurst) {
            Some(format!("Hurst {hurst:.3} not below {}", self.max_hurst))
        } else if !(stability >= self.min_stability) {
            Some(format!("stability {stability:.3} below {}", self.min_stability))
        } else {
            None
        };
        GateVerdict {
            tradable: reason.is_none(),
            reason,
        }
    }

    /// Gate from a computed score and stability.
    pub fn evaluate_pair(&self, score: &SpreadScore, stability: &SpreadStability) -> GateVerdict {
        self.evaluate(1.0 - score.adf, score.half_life_raw, score.hurst_raw, stability.score)
    }
}

/// Gate with default thresholds.
pub fn is_tradable(adf_p: f64, half_life: f64, hurst: f64, stability: f64) -> bool {
    GateConfig::default()
        .evaluate(adf_p, half_life, hurst, stability)
        .tradable
}
