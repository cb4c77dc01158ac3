// tripshare/src/web/handlers/public_trip_handlers.rs

//! Routes reached with a share secret instead of an account.

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::trip_service;
use crate::state::AppState;
use crate::web::dto::TripRequest;
use crate::web::extractors::SharedTrip;

pub async fn get_shared_trip_handler(shared: SharedTrip) -> HttpResponse {
  HttpResponse::Ok().json(shared.trip)
}

#[instrument(name = "handler::update_shared_trip", skip_all, fields(trip_id = %shared.trip.id))]
pub async fn update_shared_trip_handler(
  app_state: web::Data<AppState>,
  shared: SharedTrip,
  req_payload: web::Json<TripRequest>,
) -> Result<HttpResponse, AppError> {
  let trip = trip_service::update_trip(&app_state, shared.trip, req_payload.into_inner().into()).await?;
  Ok(HttpResponse::Ok().json(trip))
}
