// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Errors raised by the engine itself, as opposed to errors returned by handlers.
///
/// Application error types implement `From<TollgateError>` so that engine
/// failures (a missing handler, an unregistered context type) surface through
/// the same channel as business errors.
#[derive(Debug, Error)]
pub enum TollgateError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Context type mismatch (expected {expected_type}, at '{step_name}')")]
  TypeMismatch { step_name: String, expected_type: String },

  #[error("Error in handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error for '{step_name}': {message}")]
  ConfigurationError { step_name: String, message: String },

  #[error("Internal tollgate error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for TollgateError {
  fn from(err: AnyhowError) -> Self {
    TollgateError::HandlerError { source: err }
  }
}

pub type TollgateResult<T, E = TollgateError> = std::result::Result<T, E>;
