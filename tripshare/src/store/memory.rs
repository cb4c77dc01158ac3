// tripshare/src/store/memory.rs

//! In-process store used by tests and local runs without Postgres.
//!
//! It enforces the same uniqueness rules as the SQL schema: user email,
//! verification token hash, one capability per trip and capability hash.
//! Deleting a trip drops its capability and schedules.

use super::{ScheduleRepository, ShareTokenRepository, StoreError, StoreResult, TripRepository, UserRepository};
use crate::errors::Resource;
use crate::models::{Schedule, ShareCapability, Trip, User};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  users: HashMap<Uuid, User>,
  trips: HashMap<Uuid, Trip>,
  share_tokens: HashMap<Uuid, ShareCapability>,
  schedules: HashMap<Uuid, Schedule>,
}

#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
  unavailable: AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes every call fail, to exercise collaborator failures.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  fn check_available(&self) -> StoreResult<()> {
    if self.unavailable.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("memory store switched off".to_string()));
    }
    Ok(())
  }
}

fn unique(constraint: &str) -> StoreError {
  StoreError::UniqueViolation {
    constraint: constraint.to_string(),
  }
}

fn check_user_uniqueness(tables: &Tables, user: &User) -> StoreResult<()> {
  for other in tables.users.values().filter(|u| u.id != user.id) {
    if other.email == user.email {
      return Err(unique("users_email_key"));
    }
    if let (Some(mine), Some(theirs)) = (&user.verification, &other.verification) {
      if mine.token_hash == theirs.token_hash {
        return Err(unique("users_verification_token_hash_key"));
      }
    }
  }
  Ok(())
}

#[async_trait]
impl UserRepository for MemoryStore {
  async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
    self.check_available()?;
    Ok(self.tables.lock().users.get(&id).cloned())
  }

  async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    self.check_available()?;
    Ok(self.tables.lock().users.values().find(|u| u.email == email).cloned())
  }

  async fn find_by_verification_hash(&self, token_hash: &str) -> StoreResult<Option<User>> {
    self.check_available()?;
    let tables = self.tables.lock();
    let found = tables
      .users
      .values()
      .find(|u| u.verification.as_ref().is_some_and(|v| v.token_hash == token_hash))
      .cloned();
    Ok(found)
  }

  async fn create(&self, user: &User) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    if tables.users.contains_key(&user.id) {
      return Err(unique("users_pkey"));
    }
    check_user_uniqueness(&tables, user)?;
    tables.users.insert(user.id, user.clone());
    Ok(())
  }

  async fn update(&self, user: &User) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&user.id) {
      return Err(StoreError::RecordNotFound {
        resource: Resource::User,
      });
    }
    check_user_uniqueness(&tables, user)?;
    tables.users.insert(user.id, user.clone());
    Ok(())
  }

  async fn reissue_pending(&self, user: &User, previous_token_hash: &str) -> StoreResult<bool> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    let still_pending = tables
      .users
      .get(&user.id)
      .and_then(|stored| stored.verification.as_ref())
      .is_some_and(|v| v.token_hash == previous_token_hash);
    if !still_pending {
      return Ok(false);
    }
    check_user_uniqueness(&tables, user)?;
    tables.users.insert(user.id, user.clone());
    Ok(true)
  }

  async fn activate_pending(&self, id: Uuid, token_hash: &str) -> StoreResult<Option<User>> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    let Some(user) = tables.users.get_mut(&id) else {
      return Ok(None);
    };
    if !user.verification.as_ref().is_some_and(|v| v.token_hash == token_hash) {
      return Ok(None);
    }
    user.activate();
    Ok(Some(user.clone()))
  }
}

#[async_trait]
impl TripRepository for MemoryStore {
  async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Trip>> {
    self.check_available()?;
    Ok(self.tables.lock().trips.get(&id).cloned())
  }

  async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Trip>> {
    self.check_available()?;
    let tables = self.tables.lock();
    let mut trips: Vec<Trip> = tables.trips.values().filter(|t| t.owner_id == owner_id).cloned().collect();
    trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(trips)
  }

  async fn create(&self, trip: &Trip) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&trip.owner_id) {
      return Err(StoreError::RecordNotFound {
        resource: Resource::User,
      });
    }
    if tables.trips.contains_key(&trip.id) {
      return Err(unique("trips_pkey"));
    }
    tables.trips.insert(trip.id, trip.clone());
    Ok(())
  }

  async fn update(&self, trip: &Trip) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    match tables.trips.get_mut(&trip.id) {
      Some(existing) => {
        // Ownership is fixed at creation.
        existing.title = trip.title.clone();
        existing.start_date = trip.start_date;
        existing.end_date = trip.end_date;
        existing.updated_at = trip.updated_at;
        Ok(())
      }
      None => Err(StoreError::RecordNotFound {
        resource: Resource::Trip,
      }),
    }
  }

  async fn delete(&self, id: Uuid) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    if tables.trips.remove(&id).is_none() {
      return Err(StoreError::RecordNotFound {
        resource: Resource::Trip,
      });
    }
    tables.share_tokens.remove(&id);
    tables.schedules.retain(|_, s| s.trip_id != id);
    Ok(())
  }
}

#[async_trait]
impl ScheduleRepository for MemoryStore {
  async fn list_by_trip(&self, trip_id: Uuid) -> StoreResult<Vec<Schedule>> {
    self.check_available()?;
    let tables = self.tables.lock();
    let mut schedules: Vec<Schedule> = tables.schedules.values().filter(|s| s.trip_id == trip_id).cloned().collect();
    schedules.sort_by(|a, b| {
      a.start_date_time
        .cmp(&b.start_date_time)
        .then_with(|| a.created_at.cmp(&b.created_at))
    });
    Ok(schedules)
  }

  async fn find_in_trip(&self, trip_id: Uuid, schedule_id: Uuid) -> StoreResult<Option<Schedule>> {
    self.check_available()?;
    let tables = self.tables.lock();
    Ok(tables.schedules.get(&schedule_id).filter(|s| s.trip_id == trip_id).cloned())
  }

  async fn create(&self, schedule: &Schedule) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    if !tables.trips.contains_key(&schedule.trip_id) {
      return Err(StoreError::RecordNotFound {
        resource: Resource::Trip,
      });
    }
    if tables.schedules.contains_key(&schedule.id) {
      return Err(unique("schedules_pkey"));
    }
    tables.schedules.insert(schedule.id, schedule.clone());
    Ok(())
  }

  async fn update(&self, schedule: &Schedule) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    match tables.schedules.get_mut(&schedule.id) {
      Some(existing) if existing.trip_id == schedule.trip_id => {
        existing.title = schedule.title.clone();
        existing.start_date_time = schedule.start_date_time;
        existing.end_date_time = schedule.end_date_time;
        existing.memo = schedule.memo.clone();
        existing.updated_at = schedule.updated_at;
        Ok(())
      }
      _ => Err(StoreError::RecordNotFound {
        resource: Resource::Schedule,
      }),
    }
  }

  async fn delete(&self, trip_id: Uuid, schedule_id: Uuid) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    match tables.schedules.get(&schedule_id) {
      Some(existing) if existing.trip_id == trip_id => {
        tables.schedules.remove(&schedule_id);
        Ok(())
      }
      _ => Err(StoreError::RecordNotFound {
        resource: Resource::Schedule,
      }),
    }
  }
}

#[async_trait]
impl ShareTokenRepository for MemoryStore {
  async fn find_by_trip(&self, trip_id: Uuid) -> StoreResult<Option<ShareCapability>> {
    self.check_available()?;
    Ok(self.tables.lock().share_tokens.get(&trip_id).cloned())
  }

  async fn find_by_hash(&self, token_hash: &str) -> StoreResult<Option<ShareCapability>> {
    self.check_available()?;
    let tables = self.tables.lock();
    Ok(tables.share_tokens.values().find(|c| c.token_hash == token_hash).cloned())
  }

  async fn insert(&self, capability: &ShareCapability) -> StoreResult<()> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    if !tables.trips.contains_key(&capability.trip_id) {
      return Err(StoreError::RecordNotFound {
        resource: Resource::Trip,
      });
    }
    if tables.share_tokens.contains_key(&capability.trip_id) {
      return Err(unique("trip_share_tokens_pkey"));
    }
    if tables.share_tokens.values().any(|c| c.token_hash == capability.token_hash) {
      return Err(unique("trip_share_tokens_token_hash_key"));
    }
    tables.share_tokens.insert(capability.trip_id, capability.clone());
    Ok(())
  }

  async fn upsert(&self, trip_id: Uuid, token_hash: &str) -> StoreResult<ShareCapability> {
    self.check_available()?;
    let mut tables = self.tables.lock();
    if !tables.trips.contains_key(&trip_id) {
      return Err(StoreError::RecordNotFound {
        resource: Resource::Trip,
      });
    }
    if tables
      .share_tokens
      .values()
      .any(|c| c.trip_id != trip_id && c.token_hash == token_hash)
    {
      return Err(unique("trip_share_tokens_token_hash_key"));
    }
    let now = Utc::now();
    let capability = tables
      .share_tokens
      .entry(trip_id)
      .and_modify(|c| {
        c.token_hash = token_hash.to_string();
        c.updated_at = now;
      })
      .or_insert_with(|| ShareCapability {
        trip_id,
        token_hash: token_hash.to_string(),
        created_at: now,
        updated_at: now,
      })
      .clone();
    Ok(capability)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::PendingVerification;
  use chrono::{Duration, NaiveDate};

  fn pending_user(email: &str, token_hash: &str) -> User {
    User::new_pending(
      "Test".to_string(),
      email.to_string(),
      "hash".to_string(),
      PendingVerification {
        token_hash: token_hash.to_string(),
        expires_at: Utc::now() + Duration::minutes(30),
      },
    )
  }

  #[tokio::test]
  async fn duplicate_email_is_a_unique_violation() {
    let store = MemoryStore::new();
    UserRepository::create(&store, &pending_user("a@x.com", "h1")).await.unwrap();
    let err = UserRepository::create(&store, &pending_user("a@x.com", "h2")).await.unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation { .. }));
  }

  #[tokio::test]
  async fn deleting_a_trip_drops_its_capability() {
    let store = MemoryStore::new();
    let user = pending_user("a@x.com", "h1");
    UserRepository::create(&store, &user).await.unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let trip = Trip::new(user.id, "Lisbon".to_string(), day, day);
    TripRepository::create(&store, &trip).await.unwrap();
    store.upsert(trip.id, "cap").await.unwrap();

    TripRepository::delete(&store, trip.id).await.unwrap();
    assert!(store.find_by_hash("cap").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn upsert_keeps_creation_time() {
    let store = MemoryStore::new();
    let user = pending_user("a@x.com", "h1");
    UserRepository::create(&store, &user).await.unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let trip = Trip::new(user.id, "Lisbon".to_string(), day, day);
    TripRepository::create(&store, &trip).await.unwrap();

    let first = store.upsert(trip.id, "one").await.unwrap();
    let second = store.upsert(trip.id, "two").await.unwrap();
    assert_eq!(first.created_at, second.created_at);
    assert_eq!(second.token_hash, "two");
    assert!(store.find_by_hash("one").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn activation_requires_the_current_token_hash() {
    let store = MemoryStore::new();
    let user = pending_user("a@x.com", "h1");
    UserRepository::create(&store, &user).await.unwrap();

    assert!(store.activate_pending(user.id, "stale").await.unwrap().is_none());
    let activated = store.activate_pending(user.id, "h1").await.unwrap().unwrap();
    assert!(activated.is_active());
    assert!(store.activate_pending(user.id, "h1").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn reissue_is_refused_once_the_account_moved_on() {
    let store = MemoryStore::new();
    let mut user = pending_user("a@x.com", "h1");
    UserRepository::create(&store, &user).await.unwrap();
    store.activate_pending(user.id, "h1").await.unwrap();

    user.reissue_pending(
      "Late".to_string(),
      "new-hash".to_string(),
      PendingVerification {
        token_hash: "h2".to_string(),
        expires_at: Utc::now() + Duration::minutes(30),
      },
    );
    assert!(!store.reissue_pending(&user, "h1").await.unwrap());
    let stored = UserRepository::find_by_id(&store, user.id).await.unwrap().unwrap();
    assert!(stored.is_active());
    assert_eq!(stored.password_hash, "hash");
  }

  #[tokio::test]
  async fn schedules_are_scoped_to_their_trip() {
    let store = MemoryStore::new();
    let user = pending_user("a@x.com", "h1");
    UserRepository::create(&store, &user).await.unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let lisbon = Trip::new(user.id, "Lisbon".to_string(), day, day);
    let porto = Trip::new(user.id, "Porto".to_string(), day, day);
    TripRepository::create(&store, &lisbon).await.unwrap();
    TripRepository::create(&store, &porto).await.unwrap();

    let start = Utc::now();
    let tram = Schedule::new(lisbon.id, "Tram 28".to_string(), start, start + Duration::hours(1), String::new());
    ScheduleRepository::create(&store, &tram).await.unwrap();

    assert!(store.find_in_trip(porto.id, tram.id).await.unwrap().is_none());
    let err = ScheduleRepository::delete(&store, porto.id, tram.id).await.unwrap_err();
    assert!(matches!(err, StoreError::RecordNotFound { resource: Resource::Schedule }));

    TripRepository::delete(&store, lisbon.id).await.unwrap();
    assert!(store.list_by_trip(lisbon.id).await.unwrap().is_empty());
  }
}
