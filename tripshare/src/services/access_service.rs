// tripshare/src/services/access_service.rs

//! Entry points into the access gates. Each runs the access pipeline in one
//! mode and hands back only what the accepted gates resolved.

use crate::errors::AppError;
use crate::models::Trip;
use crate::pipelines::contexts::{filled, AccessCtxData, AccessMode};
use crate::services::ensure_completed;
use crate::state::AppState;
use tollgate::ContextData;
use uuid::Uuid;

async fn run_gates(state: &AppState, ctx: AccessCtxData) -> Result<ContextData<AccessCtxData>, AppError> {
  let ctx = ContextData::new(ctx);
  let result = state.tollgate.run(ctx.clone()).await?;
  ensure_completed(result, "access")?;
  Ok(ctx)
}

/// Bearer gate. `authorization_header` is the raw `Authorization` value.
pub async fn authenticate(state: &AppState, authorization_header: Option<&str>) -> Result<Uuid, AppError> {
  let mut ctx = AccessCtxData::new(state.clone(), AccessMode::Principal);
  ctx.authorization_header = authorization_header.map(str::to_string);
  let ctx = run_gates(state, ctx).await?;
  ctx.with(|c| filled(&c.principal_id, "principal_id"))
}

/// Bearer gate, then ownership of the trip whose id is the raw route segment `trip_id`.
pub async fn authorize_trip_owner(
  state: &AppState,
  authorization_header: Option<&str>,
  trip_id: &str,
) -> Result<(Uuid, Trip), AppError> {
  let mut ctx = AccessCtxData::new(state.clone(), AccessMode::TripOwner);
  ctx.authorization_header = authorization_header.map(str::to_string);
  ctx.trip_id_param = Some(trip_id.to_string());
  let ctx = run_gates(state, ctx).await?;
  ctx.with(|c| Ok((filled(&c.principal_id, "principal_id")?, filled(&c.trip, "trip")?)))
}

/// Capability gate. No principal is established.
pub async fn authorize_capability(state: &AppState, raw_secret: &str) -> Result<Trip, AppError> {
  let mut ctx = AccessCtxData::new(state.clone(), AccessMode::Capability);
  ctx.share_secret = Some(raw_secret.to_string());
  let ctx = run_gates(state, ctx).await?;
  ctx.with(|c| filled(&c.trip, "trip"))
}
