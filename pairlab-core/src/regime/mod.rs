//! Regime detection: scores the statistical health of the spread and gates
//! position sizing through a four-state label.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod label;
pub mod scores;

pub use cache::{CacheStatus, ThrottledStat};
pub use classifier::{RawStatistics, RegimeClassifier, RegimeRecord};
pub use config::RegimeConfig;
pub use label::RegimeLabel;
pub use scores::RegimeScores;
