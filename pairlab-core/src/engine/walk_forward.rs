//! Walk-forward engine: the single-timeline step loop.
//!
//! For every index `t` from `start_index` to the inferred series length, each
//! registered module is stepped in registration order. A module sees the
//! shared bundle truncated at `t` plus the records earlier modules produced at
//! the same `t`. Every returned record (or its absence) is appended to that
//! module's log.
//!
//! All misconfiguration is detected before the first step, so a run either
//! completes with a full set of logs or fails with nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::execution::ExecutionRecord;
use crate::regime::RegimeRecord;
use crate::series::SeriesBundle;
use crate::signal::SignalRecord;

use super::context::StepContext;
use super::module::{Module, StepRecord};

/// Fatal engine errors. None of these can occur once the loop has started.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("cannot infer data length for walk-forward: no entry in the shared bundle has a length")]
    UnknownLength,
    #[error("series '{name}' has length {found}, expected {expected}")]
    Misaligned {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("module '{module}' requires series '{series}', which is not in the shared bundle")]
    MissingSeries { module: String, series: String },
    #[error("duplicate module key '{0}'")]
    DuplicateModule(String),
    #[error("start index {start} is past the end of the data (length {len})")]
    StartPastEnd { start: usize, len: usize },
}

/// Per-module output: one slot per simulated step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleLog {
    pub key: String,
    pub records: Vec<Option<StepRecord>>,
}

/// Full output of a walk-forward run, in module registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub start_index: usize,
    pub len: usize,
    pub logs: Vec<ModuleLog>,
}

impl RunOutput {
    /// Number of simulated steps (`len - start_index`).
    pub fn steps(&self) -> usize {
        self.len - self.start_index
    }

    pub fn get(&self, key: &str) -> Option<&[Option<StepRecord>]> {
        self.logs
            .iter()
            .find(|l| l.key == key)
            .map(|l| l.records.as_slice())
    }

    /// Record of module `key` at absolute index `t`.
    pub fn record_at(&self, key: &str, t: usize) -> Option<&StepRecord> {
        let slot = t.checked_sub(self.start_index)?;
        self.get(key)?.get(slot)?.as_ref()
    }

    pub fn regime_log(&self, key: &str) -> Vec<Option<RegimeRecord>> {
        self.typed_log(key, StepRecord::as_regime)
    }

    pub fn signal_log(&self, key: &str) -> Vec<Option<SignalRecord>> {
        self.typed_log(key, StepRecord::as_signal)
    }

    pub fn execution_log(&self, key: &str) -> Vec<Option<ExecutionRecord>> {
        self.typed_log(key, StepRecord::as_execution)
    }

    fn typed_log<T: Clone>(
        &self,
        key: &str,
        pick: impl Fn(&StepRecord) -> Option<&T>,
    ) -> Vec<Option<T>> {
        self.get(key)
            .map(|records| {
                records
                    .iter()
                    .map(|r| r.as_ref().and_then(&pick).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Module-agnostic walk-forward driver.
///
/// Modules are borrowed mutably for the engine's lifetime so callers keep
/// ownership and can inspect or finalize them after the run.
pub struct WalkForwardEngine<'m> {
    data: SeriesBundle,
    modules: Vec<&'m mut dyn Module>,
    start_index: usize,
}

impl<'m> WalkForwardEngine<'m> {
    pub fn new(data: SeriesBundle, start_index: usize) -> Self {
        Self {
            data,
            modules: Vec::new(),
            start_index,
        }
    }

    /// Append a module. Registration order is execution order.
    pub fn register(&mut self, module: &'m mut dyn Module) -> &mut Self {
        self.modules.push(module);
        self
    }

    pub fn data(&self) -> &SeriesBundle {
        &self.data
    }

    pub fn module_keys(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.key().to_string()).collect()
    }

    /// Validate the bundle and module set, returning the timeline length.
    pub fn validate(&self) -> Result<usize, EngineError> {
        let len = self.data.infer_length().ok_or(EngineError::UnknownLength)?;

        for (name, value) in self.data.iter() {
            if let Some(found) = value.len() {
                if found != len {
                    return Err(EngineError::Misaligned {
                        name: name.to_string(),
                        expected: len,
                        found,
                    });
                }
            }
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            let key = module.key();
            if seen.contains(&key) {
                return Err(EngineError::DuplicateModule(key.to_string()));
            }
            seen.push(key);

            for &series in module.required_series() {
                if self.data.view(0).series(series).is_none() {
                    return Err(EngineError::MissingSeries {
                        module: key.to_string(),
                        series: series.to_string(),
                    });
                }
            }
        }

        if self.start_index > len {
            return Err(EngineError::StartPastEnd {
                start: self.start_index,
                len,
            });
        }

        Ok(len)
    }

    /// Run the full walk-forward simulation.
    pub fn run(&mut self) -> Result<RunOutput, EngineError> {
        let len = self.validate()?;
        let steps = len - self.start_index;

        info!(
            modules = self.modules.len(),
            start_index = self.start_index,
            len,
            "walk-forward run starting"
        );

        let mut logs: Vec<ModuleLog> = self
            .modules
            .iter()
            .map(|m| ModuleLog {
                key: m.key().to_string(),
                records: Vec::with_capacity(steps),
            })
            .collect();

        for t in self.start_index..len {
            let view = self.data.view(t);
            let mut ctx = StepContext::new();

            for (module, log) in self.modules.iter_mut().zip(logs.iter_mut()) {
                let out = module.step(t, &view, &ctx);
                ctx.push(&log.key, out.clone());
                log.records.push(out);
            }
        }

        info!(steps, "walk-forward run complete");

        Ok(RunOutput {
            start_index: self.start_index,
            len,
            logs,
        })
    }
}
