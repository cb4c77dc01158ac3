// tripshare/src/services/mod.rs

//! Operations of the service. Workflows with ordered steps run through the
//! registered pipelines; the rest are direct calls on the repositories.

pub mod access_service;
pub mod auth_service;
pub mod credential_service;
pub mod email_sender;
pub mod identity_service;
pub mod schedule_service;
pub mod secret_service;
pub mod share_service;
pub mod trip_service;

use crate::errors::AppError;
use tollgate::PipelineResult;

/// Every workflow pipeline is expected to run to completion; none of its steps stops early.
pub(crate) fn ensure_completed(result: PipelineResult, workflow: &str) -> Result<(), AppError> {
  if result.is_completed() {
    Ok(())
  } else {
    Err(AppError::Internal(format!("{} pipeline stopped before completion", workflow)))
  }
}
