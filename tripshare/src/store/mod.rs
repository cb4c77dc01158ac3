// tripshare/src/store/mod.rs

//! Persistence seams. Lookups return `Ok(None)` for a missing record so
//! callers can tell "not found" apart from a failing store.

pub mod memory;
pub mod postgres;

use crate::errors::Resource;
use crate::models::{Schedule, ShareCapability, Trip, User};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{resource} record not found")]
  RecordNotFound { resource: Resource },

  #[error("unique constraint '{constraint}' violated")]
  UniqueViolation { constraint: String },

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("store unavailable: {0}")]
  Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
  async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
  async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
  async fn find_by_verification_hash(&self, token_hash: &str) -> StoreResult<Option<User>>;
  async fn create(&self, user: &User) -> StoreResult<()>;
  /// Writes every mutable column of an existing user.
  async fn update(&self, user: &User) -> StoreResult<()>;
  /// Writes a reissued Pending account only while the stored token hash is
  /// still `previous_token_hash`. `Ok(false)` means the account moved on
  /// (activated, or reissued by another request) and nothing was written.
  async fn reissue_pending(&self, user: &User, previous_token_hash: &str) -> StoreResult<bool>;
  /// Clears the pending token of `id` only while it still equals `token_hash`,
  /// returning the activated account. `Ok(None)` when the token was already
  /// redeemed or replaced.
  async fn activate_pending(&self, id: Uuid, token_hash: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait TripRepository: Send + Sync {
  async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Trip>>;
  async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Trip>>;
  async fn create(&self, trip: &Trip) -> StoreResult<()>;
  async fn update(&self, trip: &Trip) -> StoreResult<()>;
  async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Schedules are always addressed through their trip, so a schedule id taken
/// from one trip never resolves under another.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
  async fn list_by_trip(&self, trip_id: Uuid) -> StoreResult<Vec<Schedule>>;
  async fn find_in_trip(&self, trip_id: Uuid, schedule_id: Uuid) -> StoreResult<Option<Schedule>>;
  /// Fails with `RecordNotFound { Trip }` when the trip is gone.
  async fn create(&self, schedule: &Schedule) -> StoreResult<()>;
  async fn update(&self, schedule: &Schedule) -> StoreResult<()>;
  async fn delete(&self, trip_id: Uuid, schedule_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait ShareTokenRepository: Send + Sync {
  async fn find_by_trip(&self, trip_id: Uuid) -> StoreResult<Option<ShareCapability>>;
  async fn find_by_hash(&self, token_hash: &str) -> StoreResult<Option<ShareCapability>>;
  /// Fails with `UniqueViolation` when the trip already has a capability.
  async fn insert(&self, capability: &ShareCapability) -> StoreResult<()>;
  /// Overwrites the hash of the trip's capability, creating it when absent.
  /// The original `created_at` is kept.
  async fn upsert(&self, trip_id: Uuid, token_hash: &str) -> StoreResult<ShareCapability>;
}
