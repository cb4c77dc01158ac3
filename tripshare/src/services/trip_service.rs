// tripshare/src/services/trip_service.rs

//! Trip records. Callers reach these only after the access gates have run;
//! the functions themselves do not check ownership.

use crate::errors::AppError;
use crate::models::Trip;
use crate::state::AppState;
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TripInput {
  pub title: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
}

fn validate(state: &AppState, input: &TripInput) -> Result<(), AppError> {
  state
    .validator
    .validate_trip(&input.title, input.start_date, input.end_date)
    .map_err(AppError::from)
}

pub async fn create_trip(state: &AppState, owner_id: Uuid, input: TripInput) -> Result<Trip, AppError> {
  validate(state, &input)?;
  let trip = Trip::new(owner_id, input.title.trim().to_string(), input.start_date, input.end_date);
  state.trips.create(&trip).await?;
  info!(trip_id = %trip.id, %owner_id, "Trip created.");
  Ok(trip)
}

pub async fn list_trips(state: &AppState, owner_id: Uuid) -> Result<Vec<Trip>, AppError> {
  Ok(state.trips.list_by_owner(owner_id).await?)
}

/// Applies `input` to an already resolved trip. A trip deleted in between fails `NotFound`.
pub async fn update_trip(state: &AppState, mut trip: Trip, input: TripInput) -> Result<Trip, AppError> {
  validate(state, &input)?;
  trip.title = input.title.trim().to_string();
  trip.start_date = input.start_date;
  trip.end_date = input.end_date;
  trip.updated_at = Utc::now();
  state.trips.update(&trip).await?;
  Ok(trip)
}

pub async fn delete_trip(state: &AppState, trip_id: Uuid) -> Result<(), AppError> {
  state.trips.delete(trip_id).await?;
  info!(%trip_id, "Trip deleted.");
  Ok(())
}
