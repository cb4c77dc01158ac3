// tripshare/src/web/handlers/schedule_handlers.rs

//! Trip details and schedules. Each handler is generic over the gate that
//! resolved the trip, and is mounted once under `/trips/{trip_id}` with
//! [`OwnedTrip`](crate::web::extractors::OwnedTrip) and once under
//! `/public/trips/{share_token}` with [`SharedTrip`](crate::web::extractors::SharedTrip).

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::schedule_service;
use crate::state::AppState;
use crate::web::dto::{SchedulePatchRequest, SchedulePath, ScheduleRequest};
use crate::web::extractors::GatedTrip;

pub async fn trip_details_handler<G: GatedTrip>(
  app_state: web::Data<AppState>,
  gate: G,
) -> Result<HttpResponse, AppError> {
  let details = schedule_service::trip_details(&app_state, gate.into_trip()).await?;
  Ok(HttpResponse::Ok().json(details))
}

pub async fn list_schedules_handler<G: GatedTrip>(
  app_state: web::Data<AppState>,
  gate: G,
) -> Result<HttpResponse, AppError> {
  let schedules = schedule_service::list_schedules(&app_state, gate.trip().id).await?;
  Ok(HttpResponse::Ok().json(schedules))
}

#[instrument(name = "handler::add_schedule", skip_all, fields(trip_id = %gate.trip().id))]
pub async fn add_schedule_handler<G: GatedTrip>(
  app_state: web::Data<AppState>,
  gate: G,
  req_payload: web::Json<ScheduleRequest>,
) -> Result<HttpResponse, AppError> {
  let schedule = schedule_service::add_schedule(&app_state, gate.trip().id, req_payload.into_inner().into()).await?;
  Ok(HttpResponse::Created().json(schedule))
}

pub async fn get_schedule_handler<G: GatedTrip>(
  app_state: web::Data<AppState>,
  gate: G,
  path: web::Path<SchedulePath>,
) -> Result<HttpResponse, AppError> {
  let schedule = schedule_service::get_schedule(&app_state, gate.trip().id, &path.schedule_id).await?;
  Ok(HttpResponse::Ok().json(schedule))
}

#[instrument(name = "handler::update_schedule", skip_all, fields(trip_id = %gate.trip().id))]
pub async fn update_schedule_handler<G: GatedTrip>(
  app_state: web::Data<AppState>,
  gate: G,
  path: web::Path<SchedulePath>,
  req_payload: web::Json<SchedulePatchRequest>,
) -> Result<HttpResponse, AppError> {
  let schedule = schedule_service::update_schedule(
    &app_state,
    gate.trip().id,
    &path.schedule_id,
    req_payload.into_inner().into(),
  )
  .await?;
  Ok(HttpResponse::Ok().json(schedule))
}

pub async fn delete_schedule_handler<G: GatedTrip>(
  app_state: web::Data<AppState>,
  gate: G,
  path: web::Path<SchedulePath>,
) -> Result<HttpResponse, AppError> {
  schedule_service::delete_schedule(&app_state, gate.trip().id, &path.schedule_id).await?;
  Ok(HttpResponse::NoContent().finish())
}
