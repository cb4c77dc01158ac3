// tests/schedule_tests.rs
mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::*;
use tripshare::services::schedule_service::{self, ScheduleInput, SchedulePatch};
use tripshare::services::{access_service, share_service, trip_service};
use tripshare::{AppError, Resource};
use uuid::Uuid;

fn at(hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
}

fn input(title: &str, start: u32, end: u32) -> ScheduleInput {
  ScheduleInput {
    title: title.to_string(),
    start_date_time: at(start),
    end_date_time: at(end),
    memo: None,
  }
}

#[tokio::test]
async fn test_owner_manages_schedules_of_their_trip() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;

  let dinner = schedule_service::add_schedule(&app.state, trip.id, input("Dinner", 19, 21)).await.unwrap();
  let museum = schedule_service::add_schedule(&app.state, trip.id, input("  Museum ", 10, 12)).await.unwrap();
  assert_eq!(museum.title, "Museum");
  assert_eq!(museum.memo, "");

  let listed = schedule_service::list_schedules(&app.state, trip.id).await.unwrap();
  let titles: Vec<_> = listed.iter().map(|s| s.title.as_str()).collect();
  assert_eq!(titles, ["Museum", "Dinner"], "ordered by start time");

  let patched = schedule_service::update_schedule(
    &app.state,
    trip.id,
    &dinner.id.to_string(),
    SchedulePatch {
      memo: Some("book a table".to_string()),
      end_date_time: Some(at(22)),
      ..Default::default()
    },
  )
  .await
  .unwrap();
  assert_eq!(patched.title, "Dinner");
  assert_eq!(patched.start_date_time, at(19));
  assert_eq!(patched.end_date_time, at(22));
  assert_eq!(patched.memo, "book a table");

  let fetched = schedule_service::get_schedule(&app.state, trip.id, &dinner.id.to_string()).await.unwrap();
  assert_eq!(fetched, patched);

  schedule_service::delete_schedule(&app.state, trip.id, &museum.id.to_string()).await.unwrap();
  let err = schedule_service::get_schedule(&app.state, trip.id, &museum.id.to_string()).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Schedule)));

  let details = schedule_service::trip_details(&app.state, trip.clone()).await.unwrap();
  assert_eq!(details.trip.id, trip.id);
  assert_eq!(details.schedules, vec![patched]);
}

#[tokio::test]
async fn test_share_secret_cannot_reach_another_trips_schedule() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let shared = app.trip_for(owner, "Lisbon").await;
  let private = app.trip_for(owner, "Porto").await;
  let hidden = schedule_service::add_schedule(&app.state, private.id, input("Private dinner", 19, 21)).await.unwrap();

  let issued = share_service::create_or_regenerate(&app.state, shared.id, false).await.unwrap();
  let gated = access_service::authorize_capability(&app.state, &issued.raw_secret).await.unwrap();
  assert_eq!(gated.id, shared.id);

  let hidden_id = hidden.id.to_string();
  let err = schedule_service::get_schedule(&app.state, gated.id, &hidden_id).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Schedule)));

  let err = schedule_service::update_schedule(
    &app.state,
    gated.id,
    &hidden_id,
    SchedulePatch {
      title: Some("Hijacked".to_string()),
      ..Default::default()
    },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Schedule)));

  let err = schedule_service::delete_schedule(&app.state, gated.id, &hidden_id).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Schedule)));

  let untouched = schedule_service::get_schedule(&app.state, private.id, &hidden_id).await.unwrap();
  assert_eq!(untouched, hidden);
  assert!(schedule_service::list_schedules(&app.state, gated.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_schedule_must_end_after_it_starts() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;

  for (start, end) in [(12, 10), (12, 12)] {
    let err = schedule_service::add_schedule(&app.state, trip.id, input("Backwards", start, end)).await.unwrap_err();
    match err {
      AppError::Validation { field, .. } => assert_eq!(field, "endDateTime"),
      other => panic!("expected a validation error, got {other:?}"),
    }
  }

  // A patch is checked against the stored end time.
  let lunch = schedule_service::add_schedule(&app.state, trip.id, input("Lunch", 12, 13)).await.unwrap();
  let err = schedule_service::update_schedule(
    &app.state,
    trip.id,
    &lunch.id.to_string(),
    SchedulePatch {
      start_date_time: Some(at(13) + Duration::minutes(30)),
      ..Default::default()
    },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, AppError::Validation { .. }));

  let err = schedule_service::add_schedule(&app.state, trip.id, input("", 10, 11)).await.unwrap_err();
  assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
async fn test_unparsable_and_unknown_schedule_ids() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;

  let err = schedule_service::get_schedule(&app.state, trip.id, "not-a-uuid").await.unwrap_err();
  match err {
    AppError::Validation { field, .. } => assert_eq!(field, "scheduleId"),
    other => panic!("expected a validation error, got {other:?}"),
  }

  let unknown = Uuid::new_v4().to_string();
  let err = schedule_service::delete_schedule(&app.state, trip.id, &unknown).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Schedule)));
}

#[tokio::test]
async fn test_deleting_a_trip_removes_its_schedules() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;
  let museum = schedule_service::add_schedule(&app.state, trip.id, input("Museum", 10, 12)).await.unwrap();

  trip_service::delete_trip(&app.state, trip.id).await.unwrap();

  assert!(schedule_service::list_schedules(&app.state, trip.id).await.unwrap().is_empty());
  let err = schedule_service::get_schedule(&app.state, trip.id, &museum.id.to_string()).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Schedule)));

  let err = schedule_service::add_schedule(&app.state, trip.id, input("Late", 10, 12)).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Trip)));
}
