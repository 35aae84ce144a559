//! Execution and PnL accounting on the spread.

pub mod accountant;
pub mod log;

pub use accountant::{ExecutionConfig, ExecutionRecord, SpreadAccountant, MIN_GROWTH_FACTOR};
pub use log::{ExecutionLog, LogError};
