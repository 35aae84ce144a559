//! Whole-sample pair diagnostics: quality score, rolling stability and the
//! tradability gate.
//!
//! These look at the full history at once, so they are a screening tool
//! run before a simulation, never an input to one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use pairlab_core::diagnostics::{GateVerdict, SpreadScore, SpreadStability};
use pairlab_core::spread::diagnostics::{beta_stability, spike_ratio, SpreadSummary, DEFAULT_SPIKE_Z};
use pairlab_core::spread;
use pairlab_core::stats::StandardStatistics;

use crate::config::PairConfig;
use crate::data_loader::PairData;
use crate::runner::{hedge_series, RunError};

/// Screening report for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairDiagnostics {
    pub score: SpreadScore,
    pub stability: SpreadStability,
    pub verdict: GateVerdict,
    pub summary: SpreadSummary,
    pub spike_ratio: f64,
    /// Standard deviation of hedge-ratio changes.
    pub beta_stability: f64,
}

/// Diagnose a pair with the hedge settings of `config`.
pub fn diagnose(config: &PairConfig, data: &PairData) -> Result<PairDiagnostics, RunError> {
    config.validate()?;
    let stats = StandardStatistics;

    let beta = hedge_series(config, &data.x, &data.y)?;
    let spread = spread::build(&data.x, &data.y, &beta);

    let score = SpreadScore::compute(&stats, &data.x, &data.y, &spread);
    let stability = SpreadStability::compute(&stats, &config.stability, &data.x, &data.y, &spread);
    let verdict = config.gate.evaluate_pair(&score, &stability);
    debug!(total = score.total, stability = stability.score, tradable = verdict.tradable, "pair diagnosed");

    Ok(PairDiagnostics {
        summary: SpreadSummary::compute(&spread),
        spike_ratio: spike_ratio(&spread, DEFAULT_SPIKE_Z),
        beta_stability: beta_stability(&beta),
        score,
        stability,
        verdict,
    })
}

/// Plain-text rendering for the terminal.
pub fn render(diag: &PairDiagnostics) -> String {
    let s = &diag.score;
    let st = &diag.stability;
    let mut out = String::with_capacity(1024);
    out.push_str("Spread score\n");
    out.push_str(&format!("  correlation     {:.3}\n", s.corr));
    out.push_str(&format!("  cointegration   {:.3}\n", s.coint));
    out.push_str(&format!("  adf             {:.3}\n", s.adf));
    out.push_str(&format!("  half-life       {:.3}  ({:.2} steps)\n", s.half_life, s.half_life_raw));
    out.push_str(&format!("  hurst           {:.3}  (H = {:.3})\n", s.hurst, s.hurst_raw));
    out.push_str(&format!("  variance ratio  {:.3}  (VR = {:.3})\n", s.vr, s.vr_raw));
    out.push_str(&format!("  total           {:.3}\n", s.total));
    out.push_str("Stability (pass fractions)\n");
    out.push_str(&format!("  cointegration   {:.3}\n", st.coint));
    out.push_str(&format!("  adf             {:.3}\n", st.adf));
    out.push_str(&format!("  half-life       {:.3}\n", st.half_life));
    out.push_str(&format!("  hurst           {:.3}\n", st.hurst));
    out.push_str(&format!("  score           {:.3}\n", st.score));
    out.push_str("Spread\n");
    out.push_str(&format!(
        "  mean {:.4}  std {:.4}  skew {:.3}  kurtosis {:.3}\n",
        diag.summary.mean, diag.summary.std, diag.summary.skew, diag.summary.kurtosis
    ));
    out.push_str(&format!(
        "  zero crossings {:.3}  spikes {:.3}  beta stability {:.5}\n",
        diag.summary.zero_crossing_rate, diag.spike_ratio, diag.beta_stability
    ));
    match &diag.verdict.reason {
        None => out.push_str("Verdict: TRADABLE\n"),
        Some(reason) => out.push_str(&format!("Verdict: NOT TRADABLE ({reason})\n")),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HedgeMethod;
    use crate::data_loader::{synthetic_pair, SyntheticOptions};

    #[test]
    fn cointegrated_pair_scores_well() {
        let data = synthetic_pair(&SyntheticOptions {
            len: 400,
            noise: 0.5,
            ..Default::default()
        });
        let mut config = PairConfig::default();
        config.hedge.method = HedgeMethod::RollingOls;
        let diag = diagnose(&config, &data).unwrap();

        assert!(diag.score.coint > 0.95, "coint score {}", diag.score.coint);
        assert!(diag.score.adf > 0.95, "adf score {}", diag.score.adf);
        assert!(diag.score.total > 0.5);
        assert!(diag.stability.adf > 0.7);

        let text = render(&diag);
        assert!(text.contains("Spread score"));
        assert!(text.contains("Verdict:"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let data = synthetic_pair(&SyntheticOptions {
            len: 50,
            ..Default::default()
        });
        let mut config = PairConfig::default();
        config.hedge.window = 1;
        assert!(diagnose(&config, &data).is_err());
    }
}
