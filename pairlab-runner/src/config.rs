//! Serializable pair-run configuration.
//!
//! One TOML file describes a complete run. Every section is optional and
//! falls back to its defaults, so a file may override a single threshold:
//!
//! ```toml
//! name = "KO-PEP"
//!
//! [hedge]
//! method = "rolling_ols"
//! window = 90
//!
//! [signal]
//! entry_z = 2.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pairlab_core::diagnostics::{GateConfig, StabilityConfig};
use pairlab_core::execution::ExecutionConfig;
use pairlab_core::hedge::KalmanConfig;
use pairlab_core::regime::RegimeConfig;
use pairlab_core::signal::SignalConfig;

/// Unique identifier for a run (content-addressable hash of its config).
pub type RunId = String;

/// Errors from loading or validating a [`PairConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] pairlab_core::ConfigError),
}

/// How the hedge ratio behind the spread is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HedgeMethod {
    /// Recursive Kalman filter over the whole timeline.
    #[default]
    Kalman,
    /// One OLS ratio fitted on the first `window` observations and held.
    Static,
    /// OLS over the trailing `window` observations, excluding the current one.
    RollingOls,
}

/// Hedge-ratio settings shared by every method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgeConfig {
    pub method: HedgeMethod,
    /// Calibration window (static) or lookback (rolling OLS).
    pub window: usize,
    /// Bounds applied to OLS ratios. The Kalman filter clips with its own.
    pub clip: (f64, f64),
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            method: HedgeMethod::Kalman,
            window: 60,
            clip: (-5.0, 5.0),
        }
    }
}

impl HedgeConfig {
    pub fn validate(&self) -> Result<(), pairlab_core::ConfigError> {
        if self.window < 2 {
            return Err(pairlab_core::ConfigError::TooSmall {
                field: "hedge.window",
                min: 2.0,
                value: self.window as f64,
            });
        }
        if !(self.clip.0 < self.clip.1) {
            return Err(pairlab_core::ConfigError::Invalid(format!(
                "hedge.clip lower bound ({}) must be below upper bound ({})",
                self.clip.0, self.clip.1
            )));
        }
        Ok(())
    }
}

/// Engine placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// First simulated index. Earlier observations are history only.
    pub start_index: usize,
}

/// Windows of the rolling performance metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Annualization factor.
    pub periods_per_year: f64,
    pub sharpe_window: usize,
    pub vol_window: usize,
    pub turnover_window: usize,
    pub exposure_window: usize,
    pub regime_window: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            periods_per_year: 252.0,
            sharpe_window: 60,
            vol_window: 60,
            turnover_window: 20,
            exposure_window: 20,
            regime_window: 60,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), pairlab_core::ConfigError> {
        if !(self.periods_per_year > 0.0 && self.periods_per_year.is_finite()) {
            return Err(pairlab_core::ConfigError::Invalid(format!(
                "metrics.periods_per_year must be positive, got {}",
                self.periods_per_year
            )));
        }
        for (field, window) in [
            ("metrics.sharpe_window", self.sharpe_window),
            ("metrics.vol_window", self.vol_window),
            ("metrics.turnover_window", self.turnover_window),
            ("metrics.exposure_window", self.exposure_window),
            ("metrics.regime_window", self.regime_window),
        ] {
            if window < 1 {
                return Err(pairlab_core::ConfigError::TooSmall {
                    field,
                    min: 1.0,
                    value: window as f64,
                });
            }
        }
        Ok(())
    }
}

/// Complete, reproducible description of one pair run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairConfig {
    /// Label used in artifact directory names.
    pub name: String,
    pub engine: EngineConfig,
    pub hedge: HedgeConfig,
    pub kalman: KalmanConfig,
    pub regime: RegimeConfig,
    pub signal: SignalConfig,
    pub execution: ExecutionConfig,
    pub metrics: MetricsConfig,
    pub stability: StabilityConfig,
    pub gate: GateConfig,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            name: "pair".to_string(),
            engine: EngineConfig::default(),
            hedge: HedgeConfig::default(),
            kalman: KalmanConfig::default(),
            regime: RegimeConfig::default(),
            signal: SignalConfig::default(),
            execution: ExecutionConfig::default(),
            metrics: MetricsConfig::default(),
            stability: StabilityConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

impl PairConfig {
    /// Parse a (possibly partial) TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file. Does not validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every section. A run never starts on an invalid config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hedge.validate()?;
        self.kalman.validate()?;
        self.regime.validate()?;
        self.signal.validate()?;
        self.execution.validate()?;
        self.metrics.validate()?;
        self.stability.validate()?;
        Ok(())
    }

    /// Deterministic BLAKE3 hash of the JSON form.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        let bytes = serde_json::to_vec(self).unwrap_or_else(|_| format!("{self:?}").into_bytes());
        blake3::hash(&bytes).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_is_deterministic() {
        let config = PairConfig::default();
        assert_eq!(config.run_id(), config.run_id());
        assert_eq!(config.run_id().len(), 64);
    }

    #[test]
    fn run_id_changes_with_params() {
        let a = PairConfig::default();
        let mut b = a.clone();
        b.signal.entry_z = 2.5;
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PairConfig::from_toml_str(
            r#"
            name = "KO-PEP"

            [hedge]
            method = "rolling_ols"
            window = 90

            [signal]
            entry_z = 2.5
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "KO-PEP");
        assert_eq!(config.hedge.method, HedgeMethod::RollingOls);
        assert_eq!(config.hedge.window, 90);
        assert_eq!(config.signal.entry_z, 2.5);
        assert_eq!(config.signal.exit_z, SignalConfig::default().exit_z);
        assert_eq!(config.regime, RegimeConfig::default());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(PairConfig::from_toml_str("").unwrap(), PairConfig::default());
    }

    #[test]
    fn toml_serialization_survives_reload() {
        let mut config = PairConfig::default();
        config.hedge.method = HedgeMethod::Static;
        config.execution.slippage = 0.001;
        let text = config.to_toml_string().unwrap();
        assert_eq!(PairConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn validation_catches_bad_sections() {
        let mut config = PairConfig::default();
        config.signal.exit_z = 3.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = PairConfig::default();
        config.hedge.clip = (1.0, 1.0);
        assert!(config.validate().is_err());

        let mut config = PairConfig::default();
        config.metrics.periods_per_year = 0.0;
        assert!(config.validate().is_err());

        assert!(PairConfig::default().validate().is_ok());
    }

    #[test]
    fn unknown_method_is_a_parse_error() {
        let err = PairConfig::from_toml_str("[hedge]\nmethod = \"lasso\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
