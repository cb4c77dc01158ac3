// core/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps in order against one shared context.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::TollgateError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, Instrument, Level};

/// What a phase decided.
enum PhaseOutcome<Err> {
  Proceed,
  Stopped,
  Failed(Err),
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: Option<&Vec<Handler<TData, Err>>>,
  ctx_data: &ContextData<TData>,
) -> PhaseOutcome<Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  let Some(handlers) = handlers else {
    return PhaseOutcome::Proceed;
  };
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    let span = tracing::debug_span!("handler", phase, handler_index = handler_idx);
    match handler_fn(ctx_data.clone()).instrument(span).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => {
        event!(Level::INFO, phase, "Pipeline stopped by handler.");
        return PhaseOutcome::Stopped;
      }
      Err(e) => {
        event!(Level::DEBUG, phase, error = %e, "Handler rejected.");
        return PhaseOutcome::Failed(e);
      }
    }
  }
  PhaseOutcome::Proceed
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<TollgateError> + Send + Sync + 'static,
{
  /// Executes every step in order against `ctx_data`.
  ///
  /// A skipped step runs no handler. A non-optional step with no handlers at
  /// all fails with `TollgateError::HandlerMissing`. The first `Stop` yields
  /// `PipelineResult::Stopped`; the first error is returned as is.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    )
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::TRACE, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = tracing::debug_span!("step", step_name, step_index = step_idx);

      if step_def.should_skip(&ctx_data) {
        event!(parent: &step_span, Level::TRACE, "Step skipped by condition.");
        continue;
      }

      let before = self.before.get(step_name).filter(|v| !v.is_empty());
      let on = self.on.get(step_name).filter(|v| !v.is_empty());
      let after = self.after.get(step_name).filter(|v| !v.is_empty());

      if before.is_none() && on.is_none() && after.is_none() {
        if step_def.optional {
          event!(parent: &step_span, Level::TRACE, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(TollgateError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase, handlers) in [("before", before), ("on", on), ("after", after)] {
        match run_phase(phase, handlers, &ctx_data).instrument(step_span.clone()).await {
          PhaseOutcome::Proceed => {}
          PhaseOutcome::Stopped => return Ok(PipelineResult::Stopped),
          PhaseOutcome::Failed(e) => return Err(e),
        }
      }
    }

    event!(Level::TRACE, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
