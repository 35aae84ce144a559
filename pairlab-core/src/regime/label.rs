//! Regime labels and their position multipliers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistical health of the spread, in decreasing order of tradability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegimeLabel {
    Normal,
    Degraded,
    Reset,
    Broken,
}

impl RegimeLabel {
    pub const ALL: [RegimeLabel; 4] = [Self::Normal, Self::Degraded, Self::Reset, Self::Broken];

    /// Fraction of the raw signal position allowed in this regime.
    pub fn position_multiplier(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Degraded => 0.5,
            Self::Reset | Self::Broken => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Degraded => "DEGRADED",
            Self::Reset => "RESET",
            Self::Broken => "BROKEN",
        }
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
