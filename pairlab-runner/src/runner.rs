//! Pair runner: wires hedge ratio, spread, engine modules and metrics.
//!
//! Two entry points:
//! - `run_pair_from_files()`: loads both legs from CSV, then runs. Used by the CLI.
//! - `run_pair()`: takes pre-loaded data. Used by sweeps and tests.

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use pairlab_core::engine::{EngineError, WalkForwardEngine};
use pairlab_core::execution::{ExecutionLog, SpreadAccountant};
use pairlab_core::hedge::{clip_beta, ols_hedge_ratio, rolling_ols, KalmanBeta};
use pairlab_core::regime::{RegimeClassifier, RegimeRecord};
use pairlab_core::series::names;
use pairlab_core::signal::{SignalRecord, ZScoreSignal};
use pairlab_core::spread;

use crate::config::{ConfigError, HedgeConfig, HedgeMethod, PairConfig, RunId};
use crate::data_loader::{load_pair, LoadError, PairData};
use crate::metrics::{PerformanceSummary, RollingMetrics};

/// Module keys used for the engine logs.
pub const REGIME_KEY: &str = "regime";
pub const SIGNAL_KEY: &str = "signal";

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl From<pairlab_core::ConfigError> for RunError {
    fn from(err: pairlab_core::ConfigError) -> Self {
        Self::Config(ConfigError::Invalid(err))
    }
}

/// Complete result of one pair run.
#[derive(Debug, Clone)]
pub struct PairRunResult {
    pub run_id: RunId,
    pub config: PairConfig,
    pub dataset_hash: String,
    pub synthetic: bool,
    /// Dates of the simulated steps (`start_index..len`).
    pub dates: Vec<NaiveDate>,
    /// Hedge ratio and spread over the full timeline.
    pub beta: Vec<f64>,
    pub spread: Vec<f64>,
    /// One slot per simulated step.
    pub regimes: Vec<Option<RegimeRecord>>,
    pub signals: Vec<Option<SignalRecord>>,
    pub execution: ExecutionLog,
    pub summary: PerformanceSummary,
    pub rolling: RollingMetrics,
}

impl PairRunResult {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Load both legs, then run.
pub fn run_pair_from_files(config: &PairConfig, x_path: &Path, y_path: &Path) -> Result<PairRunResult, RunError> {
    config.validate()?;
    let data = load_pair(x_path, y_path)?;
    run_pair(config, &data)
}

/// Run a pair on pre-loaded data. No I/O.
pub fn run_pair(config: &PairConfig, data: &PairData) -> Result<PairRunResult, RunError> {
    config.validate()?;
    let run_id = config.run_id();
    let short_id = run_id.get(..12).unwrap_or(&run_id).to_string();
    info!(
        run_id = %short_id,
        name = %config.name,
        len = data.len(),
        hedge = ?config.hedge.method,
        synthetic = data.synthetic,
        "pair run started"
    );

    let beta = hedge_series(config, &data.x, &data.y)?;
    let spread = spread::build(&data.x, &data.y, &beta);

    let bundle = data
        .to_bundle()
        .with_series(names::BETA, beta.clone())
        .with_series(names::SPREAD, spread.clone());

    let mut regime = RegimeClassifier::new(config.regime.clone())?;
    let mut signal = ZScoreSignal::new(config.signal)?;
    let mut accountant = SpreadAccountant::new(config.execution)?;

    let start = config.engine.start_index;
    let output = {
        let mut engine = WalkForwardEngine::new(bundle, start);
        engine.register(&mut regime).register(&mut signal).register(&mut accountant);
        engine.run()?
    };

    let dates = data.dates.get(start..).unwrap_or_default().to_vec();
    let execution = accountant.finalize(Some(&dates));
    let regimes = output.regime_log(REGIME_KEY);
    let signals = output.signal_log(SIGNAL_KEY);

    let summary = PerformanceSummary::compute(
        execution.records(),
        &regimes,
        &signals,
        config.metrics.periods_per_year,
    );
    let rolling = RollingMetrics::compute(execution.records(), &regimes, &config.metrics);

    info!(
        run_id = %short_id,
        steps = summary.steps,
        final_equity = summary.final_equity,
        trades = summary.trade_count,
        normal = summary.normal_fraction(),
        "pair run complete"
    );

    Ok(PairRunResult {
        run_id,
        config: config.clone(),
        dataset_hash: data.dataset_hash(),
        synthetic: data.synthetic,
        dates,
        beta,
        spread,
        regimes,
        signals,
        execution,
        summary,
        rolling,
    })
}

/// Hedge ratio at every index. Each value uses only data up to (Kalman) or
/// strictly before (OLS methods) its index; NaN where no estimate exists yet.
pub fn hedge_series(config: &PairConfig, x: &[f64], y: &[f64]) -> Result<Vec<f64>, RunError> {
    let HedgeConfig { method, window, clip } = config.hedge;
    let betas = match method {
        HedgeMethod::Kalman => KalmanBeta::new(config.kalman)?.run(x, y),
        HedgeMethod::Static => {
            let w = window.min(x.len());
            let beta = clip_beta(ols_hedge_ratio(&x[..w], &y[..w]), clip.0, clip.1);
            if beta.is_nan() {
                warn!(window = w, "static hedge ratio is undefined on the calibration window");
            }
            (0..x.len())
                .map(|t| if t < w { f64::NAN } else { beta })
                .collect()
        }
        HedgeMethod::RollingOls => rolling_ols(x, y, window)
            .into_iter()
            .map(|b| clip_beta(b, clip.0, clip.1))
            .collect(),
    };
    Ok(betas)
}
