// core/src/core/context.rs

//! Defines the `Handler<TData, Err>` type stored for every step hook.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by a handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>;

/// A pipeline step handler.
///
/// Each invocation receives its own clone of the shared `ContextData<TData>`
/// handle. Handlers lock the context (`.read()` / `.write()`) to read inputs and
/// record outputs, and must drop every guard before the next `.await`.
///
/// Returning `PipelineControl::Stop` or an `Err` ends the run: no later handler
/// of the same step and no later step executes.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Err> + Send + Sync>;
