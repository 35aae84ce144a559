//! The four regime scores, each in `[0, 1]`, and the classification rule.

use serde::{Deserialize, Serialize};

use super::config::RegimeConfig;
use super::label::RegimeLabel;
use crate::stats::descriptive::{finite, mean, std_dev};

/// Scores feeding the regime state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeScores {
    pub structural: f64,
    pub mean_reversion: f64,
    pub coupling: f64,
    pub shock: f64,
}

/// Non-finite p-values count as "no evidence" (1.0).
fn clip_p(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// `0.5·(1 − coint p) + 0.5·(1 − adf p)`.
pub fn structural(coint_p: f64, adf_p: f64) -> f64 {
    0.5 * (1.0 - clip_p(coint_p)) + 0.5 * (1.0 - clip_p(adf_p))
}

/// Blend of a half-life score and an anti-persistence (Hurst) score.
///
/// Zero if the half-life is non-positive or not finite.
pub fn mean_reversion(half_life: f64, hurst: f64, hl_min: f64, hl_max: f64) -> f64 {
    if !half_life.is_finite() || half_life <= 0.0 {
        return 0.0;
    }
    let hl_score = if (hl_min..=hl_max).contains(&half_life) {
        1.0
    } else {
        (-half_life / 50.0).exp()
    };
    let hurst_score = if hurst.is_finite() {
        (1.0 - hurst).clamp(0.0, 1.0)
    } else {
        0.0
    };
    0.5 * hl_score + 0.5 * hurst_score
}

pub fn coupling(correlation: f64) -> f64 {
    if correlation.is_finite() {
        correlation.abs().clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `exp(−|z|)` for the last value of `window` against the whole window.
///
/// Zero when the window has no dispersion or its last value is missing.
pub fn shock(window: &[f64]) -> f64 {
    let Some(&last) = window.last() else {
        return 0.0;
    };
    let clean = finite(window);
    let sd = std_dev(&clean);
    if !(sd > 0.0) || !last.is_finite() {
        return 0.0;
    }
    let z = (last - mean(&clean)) / sd;
    (-z.abs()).exp()
}

/// First matching rule wins: Broken, Reset, Degraded, else Normal.
pub fn classify(scores: &RegimeScores, config: &RegimeConfig) -> RegimeLabel {
    if scores.structural < config.struct_min {
        RegimeLabel::Broken
    } else if scores.shock < config.shock_min {
        RegimeLabel::Reset
    } else if scores.mean_reversion < config.mr_min || scores.coupling < config.coupling_min {
        RegimeLabel::Degraded
    } else {
        RegimeLabel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scores(structural: f64, mean_reversion: f64, coupling: f64, shock: f64) -> RegimeScores {
        RegimeScores {
            structural,
            mean_reversion,
            coupling,
            shock,
        }
    }

    #[test]
    fn structural_blends_and_clips() {
        assert_relative_eq!(structural(0.0, 0.0), 1.0);
        assert_relative_eq!(structural(0.2, 0.4), 0.7);
        assert_relative_eq!(structural(1.5, -0.5), 0.5);
        assert_relative_eq!(structural(f64::NAN, 0.0), 0.5);
    }

    #[test]
    fn mean_reversion_bands() {
        assert_relative_eq!(mean_reversion(10.0, 0.3, 2.0, 80.0), 0.5 + 0.35);
        assert_relative_eq!(
            mean_reversion(100.0, 0.3, 2.0, 80.0),
            0.5 * (-2.0_f64).exp() + 0.35
        );
        assert_eq!(mean_reversion(f64::INFINITY, 0.0, 2.0, 80.0), 0.0);
        assert_eq!(mean_reversion(-3.0, 0.0, 2.0, 80.0), 0.0);
        assert_relative_eq!(mean_reversion(10.0, f64::NAN, 2.0, 80.0), 0.5);
        assert_relative_eq!(mean_reversion(10.0, 1.4, 2.0, 80.0), 0.5);
    }

    #[test]
    fn coupling_is_absolute_correlation() {
        assert_eq!(coupling(-0.8), 0.8);
        assert_eq!(coupling(f64::NAN), 0.0);
    }

    #[test]
    fn shock_of_last_value() {
        assert_eq!(shock(&[1.0, 1.0, 1.0]), 0.0);
        assert_eq!(shock(&[]), 0.0);
        // mean 2, sd 1 -> z = 1
        assert_relative_eq!(shock(&[1.0, 2.0, 3.0]), (-1.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn classification_priority() {
        let cfg = RegimeConfig::default();
        // broken beats everything
        assert_eq!(classify(&scores(0.1, 0.0, 0.0, 0.0), &cfg), RegimeLabel::Broken);
        // reset beats degraded
        assert_eq!(classify(&scores(0.9, 0.0, 0.0, 0.1), &cfg), RegimeLabel::Reset);
        assert_eq!(classify(&scores(0.9, 0.4, 0.9, 0.9), &cfg), RegimeLabel::Degraded);
        assert_eq!(classify(&scores(0.9, 0.9, 0.4, 0.9), &cfg), RegimeLabel::Degraded);
        assert_eq!(classify(&scores(0.9, 0.9, 0.9, 0.9), &cfg), RegimeLabel::Normal);
        // thresholds are strict lower bounds
        assert_eq!(classify(&scores(0.6, 0.5, 0.5, 0.4), &cfg), RegimeLabel::Normal);
    }
}
