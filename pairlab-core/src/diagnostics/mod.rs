//! Offline spread-quality diagnostics.
//!
//! Full-sample and rolling assessments used to decide whether a pair is
//! worth trading at all. They look at the whole history and are therefore
//! not walk-forward safe; they never feed the simulation loop.

pub mod gate;
pub mod score;
pub mod stability;

pub use gate::{GateConfig, GateVerdict};
pub use score::SpreadScore;
pub use stability::{SpreadStability, StabilityConfig};
