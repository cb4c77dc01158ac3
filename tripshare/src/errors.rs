// tripshare/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use tollgate::TollgateError;

use crate::store::StoreError;
use crate::validation::ValidationFailure;

/// The kind of record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
  User,
  Trip,
  Schedule,
  Capability,
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Resource::User => "User",
      Resource::Trip => "Trip",
      Resource::Schedule => "Schedule",
      Resource::Capability => "Share link",
    };
    f.write_str(label)
  }
}

/// Every failure the service reports.
///
/// The first block is the public taxonomy; each variant maps to a fixed HTTP
/// status. The second block holds collaborator and infrastructure failures,
/// which are logged in full and answered with a generic 500.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation failed for '{field}': {reason}")]
  Validation { field: String, reason: String },

  #[error("Email is already registered and active.")]
  EmailConflict,

  #[error("Invalid email or password.")]
  InvalidCredentials,

  /// Distinct from `InvalidCredentials` on purpose: a pending account is told
  /// to verify its email. This lets a caller learn that an address has a
  /// pending registration, which is accepted for the clearer sign-in flow.
  #[error("Account is not active. Please verify your email.")]
  NotActive,

  #[error("Invalid verification token.")]
  InvalidToken,

  #[error("Verification token has expired.")]
  TokenExpired,

  #[error("{0} not found.")]
  NotFound(Resource),

  #[error("Incorrect current password.")]
  IncorrectPassword,

  #[error("Forbidden.")]
  Forbidden,

  #[error("Authentication required.")]
  Unauthenticated,

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Persistence Error: {0}")]
  Persistence(StoreError),

  #[error("Pipeline Error: {source}")]
  Workflow {
    #[from]
    source: TollgateError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Short machine-readable tag, also used as the `code` field of error bodies.
  pub fn kind_label(&self) -> &'static str {
    match self {
      AppError::Validation { .. } => "validation",
      AppError::EmailConflict => "email_conflict",
      AppError::InvalidCredentials => "invalid_credentials",
      AppError::NotActive => "not_active",
      AppError::InvalidToken => "invalid_token",
      AppError::TokenExpired => "token_expired",
      AppError::NotFound(_) => "not_found",
      AppError::IncorrectPassword => "incorrect_password",
      AppError::Forbidden => "forbidden",
      AppError::Unauthenticated => "unauthenticated",
      AppError::Conflict(_) => "conflict",
      AppError::Config(_) | AppError::Persistence(_) | AppError::Workflow { .. } | AppError::Internal(_) => "internal",
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, AppError::NotFound(_))
  }

  /// True for every failure answered with 401.
  pub fn is_unauthorized(&self) -> bool {
    self.status_code() == StatusCode::UNAUTHORIZED
  }

  /// True for collaborator and infrastructure failures whose details stay in the logs.
  pub fn is_internal(&self) -> bool {
    self.status_code().is_server_error()
  }
}

impl From<StoreError> for AppError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::RecordNotFound { resource } => AppError::NotFound(resource),
      StoreError::UniqueViolation { constraint } => AppError::Conflict(format!("duplicate value for {}", constraint)),
      other => AppError::Persistence(other),
    }
  }
}

impl From<ValidationFailure> for AppError {
  fn from(failure: ValidationFailure) -> Self {
    AppError::Validation {
      field: failure.field,
      reason: failure.reason,
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(format!("{:#}", err))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation { .. } | AppError::InvalidToken | AppError::TokenExpired => StatusCode::BAD_REQUEST,
      AppError::InvalidCredentials | AppError::NotActive | AppError::IncorrectPassword | AppError::Unauthenticated => {
        StatusCode::UNAUTHORIZED
      }
      AppError::Forbidden => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::EmailConflict | AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Persistence(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with internal error");
      return HttpResponse::build(status).json(json!({
        "error": "An internal error occurred",
        "code": self.kind_label(),
      }));
    }
    tracing::debug!(application_error = %self, status = status.as_u16(), "Responding with client error");
    HttpResponse::build(status).json(json!({
      "error": self.to_string(),
      "code": self.kind_label(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
