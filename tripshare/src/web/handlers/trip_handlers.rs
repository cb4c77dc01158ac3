// tripshare/src/web/handlers/trip_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::trip_service;
use crate::state::AppState;
use crate::web::dto::TripRequest;
use crate::web::extractors::{Authenticated, OwnedTrip};

#[instrument(name = "handler::create_trip", skip(app_state, req_payload), fields(owner_id = %auth.principal_id))]
pub async fn create_trip_handler(
  app_state: web::Data<AppState>,
  auth: Authenticated,
  req_payload: web::Json<TripRequest>,
) -> Result<HttpResponse, AppError> {
  let trip = trip_service::create_trip(&app_state, auth.principal_id, req_payload.into_inner().into()).await?;
  Ok(HttpResponse::Created().json(trip))
}

pub async fn list_trips_handler(app_state: web::Data<AppState>, auth: Authenticated) -> Result<HttpResponse, AppError> {
  let trips = trip_service::list_trips(&app_state, auth.principal_id).await?;
  Ok(HttpResponse::Ok().json(trips))
}

pub async fn get_trip_handler(owned: OwnedTrip) -> HttpResponse {
  HttpResponse::Ok().json(owned.trip)
}

#[instrument(name = "handler::update_trip", skip_all, fields(trip_id = %owned.trip.id))]
pub async fn update_trip_handler(
  app_state: web::Data<AppState>,
  owned: OwnedTrip,
  req_payload: web::Json<TripRequest>,
) -> Result<HttpResponse, AppError> {
  let trip = trip_service::update_trip(&app_state, owned.trip, req_payload.into_inner().into()).await?;
  Ok(HttpResponse::Ok().json(trip))
}

#[instrument(name = "handler::delete_trip", skip_all, fields(trip_id = %owned.trip.id))]
pub async fn delete_trip_handler(app_state: web::Data<AppState>, owned: OwnedTrip) -> Result<HttpResponse, AppError> {
  trip_service::delete_trip(&app_state, owned.trip.id).await?;
  Ok(HttpResponse::NoContent().finish())
}
