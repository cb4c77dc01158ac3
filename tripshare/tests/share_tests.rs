// tests/share_tests.rs
mod common;

use common::*;
use tripshare::services::{auth_service, share_service};
use tripshare::store::ShareTokenRepository;
use tripshare::{AppError, Resource};

#[tokio::test]
async fn test_first_issuance_stores_only_the_hash() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;

  let issued = share_service::create_or_regenerate(&app.state, trip.id, false).await.unwrap();
  assert_eq!(issued.capability.trip_id, trip.id);
  assert_eq!(issued.capability.token_hash, auth_service::hash_for_lookup(&issued.raw_secret));
  assert_ne!(issued.capability.token_hash, issued.raw_secret);
  assert_eq!(share_service::share_path(&issued.raw_secret), format!("/public/trips/{}", issued.raw_secret));

  let stored = app.store.find_by_trip(trip.id).await.unwrap().unwrap();
  assert_eq!(stored.token_hash, issued.capability.token_hash);
}

#[tokio::test]
async fn test_second_issuance_without_regenerate_conflicts() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;

  let first = share_service::create_or_regenerate(&app.state, trip.id, false).await.unwrap();
  let err = share_service::create_or_regenerate(&app.state, trip.id, false).await.unwrap_err();
  assert!(matches!(err, AppError::Conflict(_)));

  // The live link is untouched by the rejected request.
  let resolved = share_service::resolve_by_raw_secret(&app.state, &first.raw_secret).await.unwrap();
  assert_eq!(resolved.id, trip.id);
}

#[tokio::test]
async fn test_regenerate_invalidates_previous_secret() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;

  let old = share_service::create_or_regenerate(&app.state, trip.id, false).await.unwrap();
  let new = share_service::create_or_regenerate(&app.state, trip.id, true).await.unwrap();

  assert_ne!(old.raw_secret, new.raw_secret);
  assert_eq!(old.capability.created_at, new.capability.created_at, "row is updated, not replaced");

  let err = share_service::resolve_by_raw_secret(&app.state, &old.raw_secret).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Capability)));
  let resolved = share_service::resolve_by_raw_secret(&app.state, &new.raw_secret).await.unwrap();
  assert_eq!(resolved.id, trip.id);
}

#[tokio::test]
async fn test_regenerate_without_existing_capability_creates_one() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;

  assert!(share_service::share_status(&app.state, trip.id).await.unwrap().is_none());
  let issued = share_service::create_or_regenerate(&app.state, trip.id, true).await.unwrap();
  assert!(share_service::share_status(&app.state, trip.id).await.unwrap().is_some());
  share_service::resolve_by_raw_secret(&app.state, &issued.raw_secret).await.unwrap();
}

#[tokio::test]
async fn test_secret_resolves_exactly_one_trip() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let lisbon = app.trip_for(owner, "Lisbon").await;
  let porto = app.trip_for(owner, "Porto").await;

  let lisbon_link = share_service::create_or_regenerate(&app.state, lisbon.id, false).await.unwrap();
  let porto_link = share_service::create_or_regenerate(&app.state, porto.id, false).await.unwrap();

  assert_eq!(
    share_service::resolve_by_raw_secret(&app.state, &lisbon_link.raw_secret).await.unwrap().id,
    lisbon.id
  );
  assert_eq!(
    share_service::resolve_by_raw_secret(&app.state, &porto_link.raw_secret).await.unwrap().id,
    porto.id
  );
}

#[tokio::test]
async fn test_unknown_secret_is_not_found() {
  let app = test_app();
  let err = share_service::resolve_by_raw_secret(&app.state, "made-up-secret").await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(Resource::Capability)));
  assert!(err.is_not_found());
}

#[tokio::test]
async fn test_hash_is_not_accepted_as_secret() {
  let app = test_app();
  let (owner, _) = app.active_user("Alice", "a@x.com").await;
  let trip = app.trip_for(owner, "Lisbon").await;
  let issued = share_service::create_or_regenerate(&app.state, trip.id, false).await.unwrap();

  let err = share_service::resolve_by_raw_secret(&app.state, &issued.capability.token_hash)
    .await
    .unwrap_err();
  assert!(err.is_not_found());
}
