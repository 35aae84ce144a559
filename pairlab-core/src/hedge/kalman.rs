//! Recursive (Kalman filter) hedge ratio.
//!
//! State-space model with a random-walk hedge ratio:
//!
//! ```text
//! beta[t] = beta[t-1] + w,   w ~ N(0, q)
//! x[t]    = beta[t] * y[t] + v,   v ~ N(0, r)
//! ```
//!
//! Each update uses only the current observation, so the filtered series is
//! causal by construction.

use serde::{Deserialize, Serialize};

use crate::config::{ensure_finite, ensure_non_negative, ConfigError};
use crate::engine::{Module, StepContext, StepRecord};
use crate::series::{names, StepData};

/// Filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanConfig {
    /// Process-noise variance (how fast beta may drift).
    pub q: f64,
    /// Observation-noise variance.
    pub r: f64,
    pub init_beta: f64,
    pub init_var: f64,
    /// Inclusive `(lower, upper)` bounds applied after every update.
    pub clip: (f64, f64),
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            q: 1e-5,
            r: 1e-3,
            init_beta: 1.0,
            init_var: 1.0,
            clip: (-5.0, 5.0),
        }
    }
}

impl KalmanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("kalman.q", self.q)?;
        ensure_non_negative("kalman.r", self.r)?;
        if self.r == 0.0 {
            return Err(ConfigError::Invalid(
                "kalman.r must be > 0 (zero observation noise makes the gain undefined at y = 0)".into(),
            ));
        }
        ensure_non_negative("kalman.init_var", self.init_var)?;
        ensure_finite("kalman.init_beta", self.init_beta)?;
        ensure_finite("kalman.clip.0", self.clip.0)?;
        ensure_finite("kalman.clip.1", self.clip.1)?;
        if self.clip.0 >= self.clip.1 {
            return Err(ConfigError::Invalid(format!(
                "kalman.clip lower bound ({}) must be below upper bound ({})",
                self.clip.0, self.clip.1
            )));
        }
        Ok(())
    }
}

/// Online hedge-ratio estimator.
#[derive(Debug, Clone)]
pub struct KalmanBeta {
    config: KalmanConfig,
    beta: f64,
    variance: f64,
}

impl KalmanBeta {
    pub fn new(config: KalmanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            beta: config.init_beta.clamp(config.clip.0, config.clip.1),
            variance: config.init_var,
            config,
        })
    }

    pub fn config(&self) -> &KalmanConfig {
        &self.config
    }

    /// Current (last filtered) hedge ratio.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Current estimate variance.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// One predict/update cycle. Returns the clipped posterior beta.
    ///
    /// Non-finite observations leave the state untouched and return the
    /// current beta.
    pub fn update(&mut self, x_t: f64, y_t: f64) -> f64 {
        if !x_t.is_finite() || !y_t.is_finite() {
            return self.beta;
        }

        let beta_pred = self.beta;
        let var_pred = self.variance + self.config.q;

        let innovation = x_t - y_t * beta_pred;
        let s = y_t * var_pred * y_t + self.config.r;
        let gain = var_pred * y_t / s;

        let beta = beta_pred + gain * innovation;
        let variance = (1.0 - gain * y_t) * var_pred;

        // Overflow on extreme inputs: keep the prediction.
        self.beta = if beta.is_nan() { beta_pred } else { beta };
        self.variance = if variance.is_finite() && variance >= 0.0 {
            variance
        } else {
            var_pred
        };

        self.beta = self.beta.clamp(self.config.clip.0, self.config.clip.1);
        self.beta
    }

    /// Filter aligned series. Emits NaN where either input is missing; the
    /// state carries forward across gaps.
    pub fn run(&mut self, x: &[f64], y: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(y)
            .map(|(&xt, &yt)| {
                if xt.is_nan() || yt.is_nan() {
                    f64::NAN
                } else {
                    self.update(xt, yt)
                }
            })
            .collect()
    }
}

impl Module for KalmanBeta {
    fn key(&self) -> &str {
        "hedge"
    }

    fn required_series(&self) -> &[&'static str] {
        &[names::X, names::Y]
    }

    fn step(&mut self, t: usize, data: &StepData<'_>, _ctx: &StepContext) -> Option<StepRecord> {
        let x = *data.series(names::X)?.get(t)?;
        let y = *data.series(names::Y)?.get(t)?;
        let beta = if x.is_nan() || y.is_nan() {
            f64::NAN
        } else {
            self.update(x, y)
        };
        Some(StepRecord::Values(vec![(names::BETA.to_string(), beta)]))
    }
}
