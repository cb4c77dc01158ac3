// tripshare/src/services/share_service.rs

//! Share capabilities: one opaque secret per trip, stored only as its lookup
//! hash. Possession of the secret grants read and write access to exactly
//! that trip and to nothing else.

use crate::errors::{AppError, Resource};
use crate::models::{ShareCapability, Trip};
use crate::pipelines::contexts::{filled, ShareTokenCtxData};
use crate::services::{auth_service, ensure_completed};
use crate::state::AppState;
use std::fmt;
use tollgate::ContextData;
use tracing::{event, instrument, Level};
use uuid::Uuid;

/// Public path under which a raw share secret resolves.
pub fn share_path(raw_secret: &str) -> String {
  format!("/public/trips/{}", raw_secret)
}

/// A freshly stored capability and the raw secret, which is returned only here.
#[derive(Clone)]
pub struct IssuedCapability {
  pub capability: ShareCapability,
  pub raw_secret: String,
}

impl fmt::Debug for IssuedCapability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("IssuedCapability")
      .field("capability", &self.capability)
      .field("raw_secret", &"[REDACTED]")
      .finish()
  }
}

#[instrument(name = "share::create_or_regenerate", skip(state))]
pub async fn create_or_regenerate(state: &AppState, trip_id: Uuid, regenerate: bool) -> Result<IssuedCapability, AppError> {
  let ctx = ContextData::new(ShareTokenCtxData {
    app_state: state.clone(),
    trip_id,
    regenerate,
    issued: None,
    capability: None,
  });
  let result = state.tollgate.run(ctx.clone()).await?;
  ensure_completed(result, "share_token")?;
  ctx.with(|c| {
    Ok(IssuedCapability {
      capability: filled(&c.capability, "capability")?,
      raw_secret: filled(&c.issued, "issued")?.raw,
    })
  })
}

/// Finds the trip bound to a raw share secret.
pub async fn resolve_by_raw_secret(state: &AppState, raw_secret: &str) -> Result<Trip, AppError> {
  let token_hash = auth_service::hash_for_lookup(raw_secret);
  let capability = state
    .share_tokens
    .find_by_hash(&token_hash)
    .await?
    .ok_or(AppError::NotFound(Resource::Capability))?;

  match state.trips.find_by_id(capability.trip_id).await? {
    Some(trip) => Ok(trip),
    None => {
      event!(Level::WARN, trip_id = %capability.trip_id, "Capability points at a missing trip.");
      Err(AppError::NotFound(Resource::Trip))
    }
  }
}

/// The trip's capability, if any. The raw secret cannot be recovered from it.
pub async fn share_status(state: &AppState, trip_id: Uuid) -> Result<Option<ShareCapability>, AppError> {
  Ok(state.share_tokens.find_by_trip(trip_id).await?)
}
