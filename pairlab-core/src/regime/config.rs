//! Regime classifier configuration.

use serde::{Deserialize, Serialize};

use crate::config::{ensure_at_least, ensure_not_above, ensure_unit_interval, ConfigError};

/// Windows, throttle steps and thresholds of the regime classifier.
///
/// Every statistic window is a trailing slice of the `min_window` history,
/// so none may exceed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// History required before the first classification.
    pub min_window: usize,

    pub coint_window: usize,
    pub adf_window: usize,
    pub hurst_window: usize,
    pub corr_window: usize,

    /// Recompute the ADF p-value when `t % adf_step == 0`.
    pub adf_step: usize,
    pub coint_step: usize,
    pub hurst_step: usize,
    pub hurst_max_lag: usize,

    pub struct_min: f64,
    pub mr_min: f64,
    pub coupling_min: f64,
    pub shock_min: f64,

    /// Half-lives in `[hl_min, hl_max]` score fully.
    pub hl_min: f64,
    pub hl_max: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            min_window: 250,
            coint_window: 180,
            adf_window: 90,
            hurst_window: 100,
            corr_window: 120,
            adf_step: 10,
            coint_step: 25,
            hurst_step: 25,
            hurst_max_lag: 20,
            struct_min: 0.6,
            mr_min: 0.5,
            coupling_min: 0.5,
            shock_min: 0.4,
            hl_min: 2.0,
            hl_max: 80.0,
        }
    }
}

impl RegimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_at_least("regime.min_window", self.min_window, 2)?;
        for (field, window) in [
            ("regime.coint_window", self.coint_window),
            ("regime.adf_window", self.adf_window),
            ("regime.hurst_window", self.hurst_window),
            ("regime.corr_window", self.corr_window),
        ] {
            ensure_at_least(field, window, 2)?;
            ensure_not_above(field, window, "regime.min_window", self.min_window)?;
        }
        ensure_at_least("regime.adf_step", self.adf_step, 1)?;
        ensure_at_least("regime.coint_step", self.coint_step, 1)?;
        ensure_at_least("regime.hurst_step", self.hurst_step, 1)?;
        ensure_at_least("regime.hurst_max_lag", self.hurst_max_lag, 4)?;

        ensure_unit_interval("regime.struct_min", self.struct_min)?;
        ensure_unit_interval("regime.mr_min", self.mr_min)?;
        ensure_unit_interval("regime.coupling_min", self.coupling_min)?;
        ensure_unit_interval("regime.shock_min", self.shock_min)?;

        if !(self.hl_min > 0.0 && self.hl_min <= self.hl_max && self.hl_max.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "regime half-life band [{}, {}] must satisfy 0 < hl_min <= hl_max < inf",
                self.hl_min, self.hl_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RegimeConfig::default().validate().is_ok());
    }

    #[test]
    fn window_longer_than_history_is_rejected() {
        let cfg = RegimeConfig {
            coint_window: 300,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Exceeds { field: "regime.coint_window", .. }));
    }

    #[test]
    fn zero_step_is_rejected() {
        let cfg = RegimeConfig {
            adf_step: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_input_uses_defaults() {
        let cfg: RegimeConfig =
            serde_json::from_str(r#"{"min_window": 120, "coint_window": 100}"#).unwrap();
        assert_eq!(cfg.min_window, 120);
        assert_eq!(cfg.coint_window, 100);
        assert_eq!(cfg.adf_step, 10);
    }
}
