// core/src/core/control.rs

//! Flow signals returned by handlers and the outcome of a whole run.

/// Returned by a handler to either let the run proceed or halt it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Proceed to the next handler, then the next step.
  Continue,
  /// Halt immediately. No further handler of this step and no later step runs.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step was either executed or skipped.
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}

impl PipelineResult {
  pub fn is_completed(self) -> bool {
    matches!(self, PipelineResult::Completed)
  }
}
