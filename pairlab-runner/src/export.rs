//! Artifact export: CSV logs and a JSON manifest per run.
//!
//! Every CSV is step-aligned: one row per simulated step, first column
//! `date` when the run has dates and `t` otherwise. Missing values (warm-up,
//! undefined statistics) are written as empty fields.
//!
//! The manifest carries a `schema_version`. Newer versions are rejected on
//! load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{PairConfig, RunId};
use crate::metrics::{PerformanceSummary, RollingMetrics};
use crate::runner::PairRunResult;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

pub const REGIME_FILE: &str = "regime.csv";
pub const SIGNALS_FILE: &str = "signals.csv";
pub const EXECUTION_FILE: &str = "execution.csv";
pub const ROLLING_FILE: &str = "rolling_metrics.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Run metadata persisted next to the CSV logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    pub synthetic: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub config: PairConfig,
    pub summary: PerformanceSummary,
    pub files: Vec<String>,
}

/// Default schema version for older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Manifest {
    pub fn from_result(result: &PairRunResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: result.run_id.clone(),
            dataset_hash: result.dataset_hash.clone(),
            synthetic: result.synthetic,
            start_date: result.start_date(),
            end_date: result.end_date(),
            config: result.config.clone(),
            summary: result.summary.clone(),
            files: [REGIME_FILE, SIGNALS_FILE, EXECUTION_FILE, ROLLING_FILE]
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_manifest_json(manifest: &Manifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize manifest to JSON")
}

/// Parse a manifest, rejecting unknown schema versions.
pub fn import_manifest_json(json: &str) -> Result<Manifest> {
    let manifest: Manifest = serde_json::from_str(json).context("failed to deserialize manifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── CSV ────────────────────────────────────────────────────────────

fn num(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

/// Row index label: the date when available, else the step index.
struct RowIndex<'a> {
    dates: Option<&'a [NaiveDate]>,
    start: usize,
}

impl<'a> RowIndex<'a> {
    fn new(result: &'a PairRunResult, steps: usize) -> Self {
        Self {
            dates: Some(result.dates.as_slice()).filter(|d| d.len() == steps),
            start: result.config.engine.start_index,
        }
    }

    fn header(&self) -> &'static str {
        if self.dates.is_some() {
            "date"
        } else {
            "t"
        }
    }

    fn label(&self, i: usize) -> String {
        match self.dates {
            Some(d) => d[i].to_string(),
            None => (self.start + i).to_string(),
        }
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Regime labels, scores and raw statistics. Warm-up rows have only the
/// index column filled.
pub fn export_regime_csv(result: &PairRunResult) -> Result<String> {
    let index = RowIndex::new(result, result.regimes.len());
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        index.header(),
        "regime",
        "position_multiplier",
        "structural_score",
        "mean_reversion_score",
        "coupling_score",
        "shock_score",
        "adf_p",
        "coint_p",
        "hurst",
        "half_life",
        "correlation",
    ])?;

    for (i, record) in result.regimes.iter().enumerate() {
        let mut row = vec![index.label(i)];
        match record {
            Some(r) => row.extend([
                r.label.as_str().to_string(),
                num(r.position_multiplier),
                num(r.scores.structural),
                num(r.scores.mean_reversion),
                num(r.scores.coupling),
                num(r.scores.shock),
                num(r.raw.adf_p),
                num(r.raw.coint_p),
                num(r.raw.hurst),
                num(r.raw.half_life),
                num(r.raw.correlation),
            ]),
            None => row.extend(std::iter::repeat(String::new()).take(11)),
        }
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

/// Z-score, raw state and sized position per step.
pub fn export_signals_csv(result: &PairRunResult) -> Result<String> {
    let index = RowIndex::new(result, result.signals.len());
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([index.header(), "z", "raw_position", "position", "multiplier", "regime"])?;

    for (i, record) in result.signals.iter().enumerate() {
        let mut row = vec![index.label(i)];
        match record {
            Some(s) => row.extend([
                num(s.z),
                s.raw_position.as_i8().to_string(),
                num(s.position),
                num(s.multiplier),
                s.regime.map(|l| l.as_str().to_string()).unwrap_or_default(),
            ]),
            None => row.extend(std::iter::repeat(String::new()).take(5)),
        }
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

/// Rolling performance series, with window sizes in the column names.
pub fn export_rolling_csv(result: &PairRunResult) -> Result<String> {
    let m: &RollingMetrics = &result.rolling;
    let w = &m.windows;
    let index = RowIndex::new(result, m.len());
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        index.header().to_string(),
        "equity".to_string(),
        "returns".to_string(),
        format!("rolling_sharpe_{}", w.sharpe_window),
        format!("rolling_vol_{}", w.vol_window),
        "drawdown".to_string(),
        format!("rolling_turnover_{}", w.turnover_window),
        format!("rolling_exposure_{}", w.exposure_window),
        format!("pct_normal_regime_{}", w.regime_window),
    ])?;

    for i in 0..m.len() {
        wtr.write_record([
            index.label(i),
            num(m.equity[i]),
            num(m.returns[i]),
            num(m.rolling_sharpe[i]),
            num(m.rolling_volatility[i]),
            num(m.drawdown[i]),
            num(m.rolling_turnover[i]),
            num(m.rolling_exposure[i]),
            num(m.pct_normal[i]),
        ])?;
    }
    finish(wtr)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run.
///
/// Creates a directory named `{name}_{timestamp}/` under `output_dir`
/// containing `manifest.json`, `regime.csv`, `signals.csv`,
/// `execution.csv` and `rolling_metrics.csv`.
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &PairRunResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        sanitize(&result.config.name),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    write_artifacts(result, &run_dir)?;
    Ok(run_dir)
}

/// Write the artifact set into `run_dir`, creating it if needed.
pub fn write_artifacts(result: &PairRunResult, run_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |file: &str, body: String| -> Result<()> {
        let path = run_dir.join(file);
        std::fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))
    };

    write(REGIME_FILE, export_regime_csv(result)?)?;
    write(SIGNALS_FILE, export_signals_csv(result)?)?;
    write(
        EXECUTION_FILE,
        result.execution.to_csv_string().context("failed to render execution log")?,
    )?;
    write(ROLLING_FILE, export_rolling_csv(result)?)?;
    write(MANIFEST_FILE, export_manifest_json(&Manifest::from_result(result))?)?;

    info!(dir = %run_dir.display(), "artifacts written");
    Ok(())
}

/// Load the manifest from an artifact directory.
pub fn load_manifest(dir: &Path) -> Result<Manifest> {
    let path = dir.join(MANIFEST_FILE);
    let json = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    import_manifest_json(&json)
}

/// Keep directory names portable.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "pair".to_string()
    } else {
        cleaned
    }
}
