//! PairLab Runner: pair run orchestration, sweeps, metrics and export.
//!
//! This crate builds on `pairlab-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - Price loading from CSV and pair alignment, plus synthetic pairs
//! - Single-pair runner (hedge ratio → spread → regime → signal → PnL)
//! - Whole-sample pair diagnostics and tradability gate
//! - Parallel parameter sweeps over the signal thresholds
//! - Performance summary and rolling metrics
//! - CSV/JSON artifact export

pub mod config;
pub mod data_loader;
pub mod diagnose;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, HedgeConfig, HedgeMethod, MetricsConfig, PairConfig, RunId};
pub use data_loader::{
    align_pair, load_pair, load_price_csv, synthetic_pair, LoadError, PairData, PriceSeries,
    SyntheticOptions,
};
pub use diagnose::{diagnose, PairDiagnostics};
pub use export::{load_manifest, save_artifacts, write_artifacts, Manifest, SCHEMA_VERSION};
pub use metrics::{PerformanceSummary, RollingMetrics};
pub use runner::{run_pair, run_pair_from_files, PairRunResult, RunError};
pub use sweep::{ParamSweep, SignalGrid, SweepResults};
