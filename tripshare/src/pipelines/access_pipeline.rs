// tripshare/src/pipelines/access_pipeline.rs

//! The ordered authorization gates run ahead of every protected handler.
//!
//! ```text
//! authenticate_bearer      (skipped for Capability)
//! check_trip_ownership     (TripOwner only, after the bearer gate)
//! resolve_share_capability (Capability only)
//! ```
//!
//! A gate that rejects returns an error, which ends the run: no later gate
//! and no handler executes. Gates only read their inputs and write their own
//! slots in a per-request context.

use crate::errors::{AppError, Resource};
use crate::pipelines::contexts::{filled, AccessCtxData, AccessMode};
use crate::services::share_service;
use std::sync::Arc;
use tollgate::{ContextData, Pipeline, PipelineControl, SkipCondition, Tollgate};
use tracing::{event, instrument, Level};
use uuid::Uuid;

const BEARER_PREFIX: &str = "bearer ";

pub fn register_access_pipeline(tollgate: &Arc<Tollgate<AppError>>) {
  let skip_bearer: SkipCondition<AccessCtxData> = Arc::new(|c: &AccessCtxData| c.mode == AccessMode::Capability);
  let skip_ownership: SkipCondition<AccessCtxData> = Arc::new(|c: &AccessCtxData| c.mode != AccessMode::TripOwner);
  let skip_capability: SkipCondition<AccessCtxData> = Arc::new(|c: &AccessCtxData| c.mode != AccessMode::Capability);

  let mut access_p = Pipeline::<AccessCtxData, AppError>::new(&[
    ("authenticate_bearer", false, Some(skip_bearer)),
    ("check_trip_ownership", false, Some(skip_ownership)),
    ("resolve_share_capability", false, Some(skip_capability)),
  ]);

  access_p.on_root("authenticate_bearer", authenticate_bearer);
  access_p.on_root("check_trip_ownership", check_trip_ownership);
  access_p.on_root("resolve_share_capability", resolve_share_capability);

  tollgate.register_pipeline(access_p);
  tracing::info!("Access pipeline registered.");
}

/// Extracts the credential from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
  let value = header_value.trim_start();
  let scheme = value.get(..BEARER_PREFIX.len())?;
  if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
    return None;
  }
  let token = value.get(BEARER_PREFIX.len()..)?.trim();
  (!token.is_empty()).then_some(token)
}

async fn authenticate_bearer(ctx_data: ContextData<AccessCtxData>) -> Result<PipelineControl, AppError> {
  let (signer, header) = ctx_data.with(|c| (c.app_state.signer.clone(), c.authorization_header.clone()));
  let Some(header) = header else {
    event!(Level::DEBUG, "No Authorization header.");
    return Err(AppError::Unauthenticated);
  };
  let token = bearer_token(&header).ok_or(AppError::Unauthenticated)?;
  let principal_id = signer.verify(token)?;
  ctx_data.update(|c| c.principal_id = Some(principal_id));
  Ok(PipelineControl::Continue)
}

#[instrument(name = "gate::check_trip_ownership", skip(ctx_data), err(Display))]
async fn check_trip_ownership(ctx_data: ContextData<AccessCtxData>) -> Result<PipelineControl, AppError> {
  let (trips, principal, raw_id) = ctx_data.with(|c| {
    (
      c.app_state.trips.clone(),
      filled(&c.principal_id, "principal_id"),
      c.trip_id_param.clone().unwrap_or_default(),
    )
  });
  let principal = principal?;

  let trip_id = Uuid::parse_str(raw_id.trim()).map_err(|_| AppError::Validation {
    field: "id".to_string(),
    reason: "must be a valid trip id".to_string(),
  })?;

  let trip = trips.find_by_id(trip_id).await?.ok_or(AppError::NotFound(Resource::Trip))?;
  if !trip.is_owned_by(principal) {
    event!(Level::WARN, %trip_id, %principal, "Principal does not own the trip.");
    return Err(AppError::Forbidden);
  }

  ctx_data.update(|c| c.trip = Some(trip));
  Ok(PipelineControl::Continue)
}

async fn resolve_share_capability(ctx_data: ContextData<AccessCtxData>) -> Result<PipelineControl, AppError> {
  let (app_state, secret) = ctx_data.with(|c| (c.app_state.clone(), c.share_secret.clone()));
  let secret = secret.ok_or(AppError::NotFound(Resource::Capability))?;
  let trip = share_service::resolve_by_raw_secret(&app_state, &secret).await?;
  ctx_data.update(|c| c.trip = Some(trip));
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::bearer_token;

  #[test]
  fn bearer_scheme_is_case_insensitive() {
    assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
    assert_eq!(bearer_token("bearer   abc"), Some("abc"));
    assert_eq!(bearer_token("BEARER abc"), Some("abc"));
  }

  #[test]
  fn other_schemes_and_empty_tokens_are_rejected() {
    assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
    assert_eq!(bearer_token("Bearer "), None);
    assert_eq!(bearer_token("abc"), None);
  }
}
