//! The module step contract.
//!
//! Every stateful stage of the simulation (regime classifier, signal
//! generator, accountant, or anything user-defined) implements [`Module`].
//! The engine depends only on this trait, never on concrete module types.

use serde::{Deserialize, Serialize};

use crate::execution::ExecutionRecord;
use crate::regime::RegimeRecord;
use crate::series::StepData;
use crate::signal::SignalRecord;

use super::context::StepContext;

/// Output of one module at one index. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum StepRecord {
    Regime(RegimeRecord),
    Signal(SignalRecord),
    Execution(ExecutionRecord),
    /// Named scalar outputs for modules without a dedicated record type.
    Values(Vec<(String, f64)>),
}

impl StepRecord {
    pub fn as_regime(&self) -> Option<&RegimeRecord> {
        match self {
            Self::Regime(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_signal(&self) -> Option<&SignalRecord> {
        match self {
            Self::Signal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_execution(&self) -> Option<&ExecutionRecord> {
        match self {
            Self::Execution(e) => Some(e),
            _ => None,
        }
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        match self {
            Self::Values(v) => v.iter().find(|(n, _)| n == name).map(|(_, x)| *x),
            _ => None,
        }
    }
}

/// A stateful walk-forward stage.
///
/// # Contract
/// - `step` sees shared data only through `data`, which is truncated at `t`.
/// - `step` may mutate only the module's own state.
/// - Insufficient history is not an error: return `None` and let downstream
///   modules treat it as "no actionable output this step".
/// - `ctx` holds the records already produced at this same `t` by modules
///   registered earlier. Later modules are not visible.
pub trait Module: Send {
    /// Stable identity of this module within a run (e.g. "regime").
    fn key(&self) -> &str;

    /// Names of series this module reads. Checked by the engine before the
    /// first step so a missing input aborts the run with no partial output.
    fn required_series(&self) -> &[&'static str] {
        &[]
    }

    /// Advance the module to index `t`.
    fn step(&mut self, t: usize, data: &StepData<'_>, ctx: &StepContext) -> Option<StepRecord>;
}
