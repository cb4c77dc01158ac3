// src/lib.rs

//! Tollgate: an async, type-safe, ordered step pipeline engine.
//!
//! A pipeline is an ordered list of named steps. Each step carries `before`,
//! `on` and `after` handlers which operate on a shared [`ContextData`]. The
//! first handler that fails or returns [`PipelineControl::Stop`] ends the run,
//! so no later step (and no later handler in the same step) executes. That
//! property is what makes the engine suitable for authorization gates:
//! a rejected gate can never be bypassed by a step further down the list.
//!
//! Features:
//!  - Named steps with before/on/after hooks.
//!  - Optional steps and per-step `skip_if` conditions evaluated against the context.
//!  - Structural edits (insert before/after, remove, toggle optionality).
//!  - A type-keyed registry ([`Tollgate`]) that dispatches on the context type.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

// --- Re-exports for the Public API ---

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{TollgateError, TollgateResult};

pub use crate::registry::Tollgate;

/*
    Typical use:
    1. Define a context struct `MyCtx` holding the request inputs and the slots steps fill in.
    2. Create a `Pipeline<MyCtx, MyError>` with its ordered step names.
    3. Attach async handlers with `.on_root()`, `.before_root()` or `.after_root()`.
    4. Register the pipeline on a `Tollgate<MyError>` at startup.
    5. Per request: `tollgate.run(ContextData::new(ctx)).await`, then read the filled slots.
*/
