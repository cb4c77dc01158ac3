// tripshare/src/web/handlers/share_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::share_service;
use crate::state::AppState;
use crate::web::dto::{ShareQuery, ShareStatusResponse, ShareTokenResponse};
use crate::web::extractors::OwnedTrip;

/// Issues the trip's share link. The raw secret appears in this response only.
#[instrument(name = "handler::share_trip", skip(app_state, owned), fields(trip_id = %owned.trip.id))]
pub async fn share_trip_handler(
  app_state: web::Data<AppState>,
  owned: OwnedTrip,
  query: web::Query<ShareQuery>,
) -> Result<HttpResponse, AppError> {
  let issued = share_service::create_or_regenerate(&app_state, owned.trip.id, query.regenerate).await?;
  Ok(HttpResponse::Created().json(ShareTokenResponse {
    share_url: share_service::share_path(&issued.raw_secret),
    share_token: issued.raw_secret,
    created_at: issued.capability.created_at,
    updated_at: issued.capability.updated_at,
  }))
}

pub async fn share_status_handler(app_state: web::Data<AppState>, owned: OwnedTrip) -> Result<HttpResponse, AppError> {
  let capability = share_service::share_status(&app_state, owned.trip.id).await?;
  Ok(HttpResponse::Ok().json(ShareStatusResponse::from(capability)))
}
