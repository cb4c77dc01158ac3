// tripshare/src/services/schedule_service.rs

//! A trip's itinerary. Every call takes the trip the access gates resolved,
//! and schedule ids are looked up within that trip only: an id belonging to
//! another trip is `NotFound { Schedule }`, whichever gate admitted the caller.

use crate::errors::{AppError, Resource};
use crate::models::{Schedule, Trip};
use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ScheduleInput {
  pub title: String,
  pub start_date_time: DateTime<Utc>,
  pub end_date_time: DateTime<Utc>,
  pub memo: Option<String>,
}

/// Partial update. Absent fields keep their stored value; the merged times are validated together.
#[derive(Debug, Clone, Default)]
pub struct SchedulePatch {
  pub title: Option<String>,
  pub start_date_time: Option<DateTime<Utc>>,
  pub end_date_time: Option<DateTime<Utc>>,
  pub memo: Option<String>,
}

/// A trip together with its schedules.
#[derive(Debug, Serialize)]
pub struct TripDetails {
  #[serde(flatten)]
  pub trip: Trip,
  pub schedules: Vec<Schedule>,
}

fn parse_schedule_id(raw: &str) -> Result<Uuid, AppError> {
  Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation {
    field: "scheduleId".to_string(),
    reason: "must be a valid schedule id".to_string(),
  })
}

async fn find_in_trip(state: &AppState, trip_id: Uuid, raw_schedule_id: &str) -> Result<Schedule, AppError> {
  let schedule_id = parse_schedule_id(raw_schedule_id)?;
  state
    .schedules
    .find_in_trip(trip_id, schedule_id)
    .await?
    .ok_or(AppError::NotFound(Resource::Schedule))
}

pub async fn trip_details(state: &AppState, trip: Trip) -> Result<TripDetails, AppError> {
  let schedules = state.schedules.list_by_trip(trip.id).await?;
  Ok(TripDetails { trip, schedules })
}

pub async fn list_schedules(state: &AppState, trip_id: Uuid) -> Result<Vec<Schedule>, AppError> {
  Ok(state.schedules.list_by_trip(trip_id).await?)
}

#[instrument(skip(state, input), fields(%trip_id), err(Display))]
pub async fn add_schedule(state: &AppState, trip_id: Uuid, input: ScheduleInput) -> Result<Schedule, AppError> {
  state
    .validator
    .validate_schedule(&input.title, input.start_date_time, input.end_date_time)?;
  let schedule = Schedule::new(
    trip_id,
    input.title.trim().to_string(),
    input.start_date_time,
    input.end_date_time,
    input.memo.unwrap_or_default(),
  );
  state.schedules.create(&schedule).await?;
  info!(schedule_id = %schedule.id, "Schedule added.");
  Ok(schedule)
}

pub async fn get_schedule(state: &AppState, trip_id: Uuid, raw_schedule_id: &str) -> Result<Schedule, AppError> {
  find_in_trip(state, trip_id, raw_schedule_id).await
}

#[instrument(skip(state, patch), fields(%trip_id), err(Display))]
pub async fn update_schedule(
  state: &AppState,
  trip_id: Uuid,
  raw_schedule_id: &str,
  patch: SchedulePatch,
) -> Result<Schedule, AppError> {
  let mut schedule = find_in_trip(state, trip_id, raw_schedule_id).await?;

  let title = patch.title.unwrap_or_else(|| schedule.title.clone());
  let start = patch.start_date_time.unwrap_or(schedule.start_date_time);
  let end = patch.end_date_time.unwrap_or(schedule.end_date_time);
  state.validator.validate_schedule(&title, start, end)?;

  schedule.title = title.trim().to_string();
  schedule.start_date_time = start;
  schedule.end_date_time = end;
  if let Some(memo) = patch.memo {
    schedule.memo = memo;
  }
  schedule.updated_at = Utc::now();
  state.schedules.update(&schedule).await?;
  Ok(schedule)
}

pub async fn delete_schedule(state: &AppState, trip_id: Uuid, raw_schedule_id: &str) -> Result<(), AppError> {
  let schedule_id = parse_schedule_id(raw_schedule_id)?;
  state.schedules.delete(trip_id, schedule_id).await?;
  info!(%trip_id, %schedule_id, "Schedule deleted.");
  Ok(())
}
