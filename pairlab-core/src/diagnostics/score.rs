//! Weighted full-sample spread score.

use serde::{Deserialize, Serialize};

use crate::stats::StatisticsProvider;

pub const WEIGHT_CORR: f64 = 0.05;
pub const WEIGHT_COINT: f64 = 0.30;
pub const WEIGHT_ADF: f64 = 0.25;
pub const WEIGHT_HALF_LIFE: f64 = 0.20;
pub const WEIGHT_HURST: f64 = 0.10;
pub const WEIGHT_VR: f64 = 0.10;

/// Half-lives in this band score 1, everything else 0.
pub const SCORE_HL_MIN: f64 = 5.0;
pub const SCORE_HL_MAX: f64 = 60.0;

const HURST_MAX_LAG: usize = 20;
const VR_LAG: usize = 2;

/// Component scores (each nominally in `[0, 1]`), the raw inputs behind
/// them, and the weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadScore {
    pub corr: f64,
    pub coint: f64,
    pub adf: f64,
    pub half_life: f64,
    pub hurst: f64,
    pub vr: f64,
    pub half_life_raw: f64,
    pub hurst_raw: f64,
    pub vr_raw: f64,
    pub total: f64,
}

impl SpreadScore {
    pub fn compute<S: StatisticsProvider + ?Sized>(stats: &S, x: &[f64], y: &[f64], spread: &[f64]) -> Self {
        let corr = or_zero(stats.correlation(x, y).abs());
        let coint = 1.0 - stats.cointegration_test(x, y).p_value;
        let adf = 1.0 - stats.stationarity_test(spread).p_value;

        let half_life_raw = stats.half_life(spread);
        let hurst_raw = stats.hurst_exponent(spread, HURST_MAX_LAG);
        let vr_raw = stats.variance_ratio(spread, VR_LAG);

        let half_life = half_life_score(half_life_raw);
        let hurst = or_zero((1.0 - hurst_raw).max(0.0));
        let vr = or_zero((1.0 - vr_raw).max(0.0));

        let total = WEIGHT_CORR * corr
            + WEIGHT_COINT * coint
            + WEIGHT_ADF * adf
            + WEIGHT_HALF_LIFE * half_life
            + WEIGHT_HURST * hurst
            + WEIGHT_VR * vr;

        Self {
            corr,
            coint,
            adf,
            half_life,
            hurst,
            vr,
            half_life_raw,
            hurst_raw,
            vr_raw,
            total,
        }
    }
}

pub fn half_life_score(half_life: f64) -> f64 {
    if (SCORE_HL_MIN..=SCORE_HL_MAX).contains(&half_life) {
        1.0
    } else {
        0.0
    }
}

fn or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
