// core/src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` handlers.
//!
//! Handlers may fail with any error type convertible into the pipeline's `Err`.

use crate::core::context::{Handler, HandlerFuture};
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::error::TollgateError;
use crate::pipeline::definition::Pipeline;
use std::collections::HashMap;
use std::future::Future;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<TollgateError> + Send + Sync + 'static,
{
  fn erase<F, UserErr>(handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static) -> Handler<TData, Err>
  where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    Box::new(move |ctx_data: ContextData<TData>| -> HandlerFuture<Err> {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    })
  }

  fn phase_map(&mut self, phase: Phase) -> &mut HashMap<String, Vec<Handler<TData, Err>>> {
    match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    }
  }

  fn push_handler(&mut self, phase: Phase, step_name: &str, handler: Handler<TData, Err>) {
    self.ensure_step_exists(step_name);
    event!(Level::TRACE, step_name, ?phase, "Handler registered.");
    self.phase_map(phase).entry(step_name.to_string()).or_default().push(handler);
  }

  /// Registers a handler that runs before the step's `on` handlers.
  pub fn before_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::Before, step_name, Self::erase(handler_fn));
  }

  /// Registers the main handler of a step.
  pub fn on_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::On, step_name, Self::erase(handler_fn));
  }

  /// Registers a handler that runs after the step's `on` handlers.
  pub fn after_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::After, step_name, Self::erase(handler_fn));
  }

  /// Registers an already boxed handler, e.g. one shared by several pipelines.
  pub fn on_root_boxed(&mut self, step_name: &str, handler: Handler<TData, Err>) {
    self.push_handler(Phase::On, step_name, handler);
  }
}
