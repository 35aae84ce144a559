//! Per-step context: records produced earlier in the same step.

use crate::execution::ExecutionRecord;
use crate::regime::RegimeRecord;
use crate::signal::SignalRecord;

use super::module::StepRecord;

/// Insertion-ordered list of `(module key, record)` for the current step.
///
/// Built empty at the start of each step and discarded at its end. A module
/// that returned `None` still occupies a slot, so `contains` distinguishes
/// "ran with no output" from "not run yet".
#[derive(Debug, Default)]
pub struct StepContext {
    entries: Vec<(String, Option<StepRecord>)>,
}

impl StepContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: &str, record: Option<StepRecord>) {
        self.entries.push((key.to_string(), record));
    }

    /// Record emitted by the module with this key, if it ran and produced one.
    pub fn get(&self, key: &str) -> Option<&StepRecord> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, r)| r.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Most recent regime record in this step, whatever module produced it.
    pub fn regime(&self) -> Option<&RegimeRecord> {
        self.latest(StepRecord::as_regime)
    }

    pub fn signal(&self) -> Option<&SignalRecord> {
        self.latest(StepRecord::as_signal)
    }

    pub fn execution(&self) -> Option<&ExecutionRecord> {
        self.latest(StepRecord::as_execution)
    }

    fn latest<'a, T>(&'a self, pick: impl Fn(&'a StepRecord) -> Option<&'a T>) -> Option<&'a T> {
        self.entries
            .iter()
            .rev()
            .find_map(|(_, r)| r.as_ref().and_then(&pick))
    }
}
