//! PairLab Core: walk-forward engine, regime classifier, hedge ratio, signal, PnL.
//!
//! This crate contains the simulation core of a pairs-trading backtester:
//! - Shared series bundle with causal per-step views
//! - Walk-forward engine driving stateful modules in registration order
//! - Regime classifier with throttled heavy statistics
//! - Kalman and OLS hedge ratios, spread construction and diagnostics
//! - Z-score hysteresis signal and spread PnL accountant
//! - Statistics provider (ADF, Engle-Granger, half-life, Hurst, variance ratio)

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod execution;
pub mod hedge;
pub mod regime;
pub mod series;
pub mod signal;
pub mod spread;
pub mod stats;
pub mod synthetic;

pub use config::ConfigError;
pub use engine::{EngineError, Module, RunOutput, StepContext, StepRecord, WalkForwardEngine};
pub use series::{SeriesBundle, SharedValue, StepData};
