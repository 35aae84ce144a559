//! Hedge-ratio estimators.

pub mod kalman;
pub mod ols;

pub use kalman::{KalmanBeta, KalmanConfig};
pub use ols::{clip_beta, ols_hedge_ratio, rolling_ols};
