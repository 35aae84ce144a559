//! Trading signal generation.

pub mod zscore;

pub use zscore::{PositionState, SignalConfig, SignalRecord, ZScoreSignal};
