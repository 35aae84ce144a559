//! Walk-forward engine and the module step contract.
//!
//! The engine holds the shared, read-only data bundle and an ordered list of
//! stateful modules. Per step it:
//!
//! 1. builds an empty [`StepContext`]
//! 2. steps each module in registration order with a causal data view
//! 3. records each module's output into the context and its log
//!
//! Modules are agnostic to the engine beyond [`Module`]; the engine is
//! agnostic to module identity beyond [`Module::key`].

pub mod context;
pub mod module;
pub mod walk_forward;

pub use context::StepContext;
pub use module::{Module, StepRecord};
pub use walk_forward::{EngineError, ModuleLog, RunOutput, WalkForwardEngine};
