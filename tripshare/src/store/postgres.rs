// tripshare/src/store/postgres.rs

use super::{ScheduleRepository, ShareTokenRepository, StoreError, StoreResult, TripRepository, UserRepository};
use crate::errors::Resource;
use crate::models::{PendingVerification, Schedule, ShareCapability, Trip, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{event, Level};
use uuid::Uuid;

const USER_COLUMNS: &str =
  "id, name, email, password_hash, verification_token_hash, verification_token_expires_at, created_at, updated_at";
const TRIP_COLUMNS: &str = "id, owner_id, title, start_date, end_date, created_at, updated_at";
const SHARE_COLUMNS: &str = "trip_id, token_hash, created_at, updated_at";
const SCHEDULE_COLUMNS: &str = "id, trip_id, title, start_date_time, end_date_time, memo, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
  id: Uuid,
  name: String,
  email: String,
  password_hash: String,
  verification_token_hash: Option<String>,
  verification_token_expires_at: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
  fn from(row: UserRow) -> Self {
    // The schema's CHECK keeps both columns set or both cleared.
    let verification = match (row.verification_token_hash, row.verification_token_expires_at) {
      (Some(token_hash), Some(expires_at)) => Some(PendingVerification { token_hash, expires_at }),
      _ => None,
    };
    User {
      id: row.id,
      name: row.name,
      email: row.email,
      password_hash: row.password_hash,
      verification,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

/// Maps unique violations to `StoreError::UniqueViolation` and foreign-key
/// violations to a missing `parent`, everything else to `Database`.
fn map_write_error(err: sqlx::Error, parent: Resource) -> StoreError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      let constraint = db_err.constraint().unwrap_or("unknown").to_string();
      event!(Level::DEBUG, %constraint, "Unique constraint rejected write.");
      return StoreError::UniqueViolation { constraint };
    }
    if db_err.is_foreign_key_violation() {
      return StoreError::RecordNotFound { resource: parent };
    }
  }
  StoreError::Database(err)
}

/// Postgres-backed repositories sharing one pool.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn fetch_user(&self, clause: &str, value: &str) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, clause);
    let row = sqlx::query_as::<_, UserRow>(&sql)
      .bind(value)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(User::from))
  }
}

#[async_trait]
impl UserRepository for PgStore {
  async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let row = sqlx::query_as::<_, UserRow>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(User::from))
  }

  async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    self.fetch_user("email", email).await
  }

  async fn find_by_verification_hash(&self, token_hash: &str) -> StoreResult<Option<User>> {
    self.fetch_user("verification_token_hash", token_hash).await
  }

  async fn create(&self, user: &User) -> StoreResult<()> {
    let (token_hash, expires_at) = split_verification(user);
    sqlx::query(
      "INSERT INTO users (id, name, email, password_hash, verification_token_hash, verification_token_expires_at, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(token_hash)
    .bind(expires_at)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|err| map_write_error(err, Resource::User))?;
    Ok(())
  }

  async fn update(&self, user: &User) -> StoreResult<()> {
    let (token_hash, expires_at) = split_verification(user);
    let result = sqlx::query(
      "UPDATE users SET name = $2, email = $3, password_hash = $4, verification_token_hash = $5, \
       verification_token_expires_at = $6, updated_at = $7 WHERE id = $1",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(token_hash)
    .bind(expires_at)
    .bind(user.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|err| map_write_error(err, Resource::User))?;
    if result.rows_affected() == 0 {
      return Err(StoreError::RecordNotFound {
        resource: Resource::User,
      });
    }
    Ok(())
  }

  async fn reissue_pending(&self, user: &User, previous_token_hash: &str) -> StoreResult<bool> {
    let (token_hash, expires_at) = split_verification(user);
    let result = sqlx::query(
      "UPDATE users SET name = $2, password_hash = $3, verification_token_hash = $4, \
       verification_token_expires_at = $5, updated_at = $6 \
       WHERE id = $1 AND verification_token_hash = $7",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.password_hash)
    .bind(token_hash)
    .bind(expires_at)
    .bind(user.updated_at)
    .bind(previous_token_hash)
    .execute(&self.pool)
    .await
    .map_err(|err| map_write_error(err, Resource::User))?;
    Ok(result.rows_affected() == 1)
  }

  async fn activate_pending(&self, id: Uuid, token_hash: &str) -> StoreResult<Option<User>> {
    let sql = format!(
      "UPDATE users SET verification_token_hash = NULL, verification_token_expires_at = NULL, updated_at = NOW() \
       WHERE id = $1 AND verification_token_hash = $2 RETURNING {}",
      USER_COLUMNS
    );
    let row = sqlx::query_as::<_, UserRow>(&sql)
      .bind(id)
      .bind(token_hash)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(User::from))
  }
}

fn split_verification(user: &User) -> (Option<&str>, Option<DateTime<Utc>>) {
  match &user.verification {
    Some(v) => (Some(v.token_hash.as_str()), Some(v.expires_at)),
    None => (None, None),
  }
}

#[async_trait]
impl TripRepository for PgStore {
  async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Trip>> {
    let sql = format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS);
    let trip = sqlx::query_as::<_, Trip>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(trip)
  }

  async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Trip>> {
    let sql = format!(
      "SELECT {} FROM trips WHERE owner_id = $1 ORDER BY created_at DESC",
      TRIP_COLUMNS
    );
    let trips = sqlx::query_as::<_, Trip>(&sql)
      .bind(owner_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(trips)
  }

  async fn create(&self, trip: &Trip) -> StoreResult<()> {
    sqlx::query(
      "INSERT INTO trips (id, owner_id, title, start_date, end_date, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(trip.id)
    .bind(trip.owner_id)
    .bind(&trip.title)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(trip.created_at)
    .bind(trip.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|err| map_write_error(err, Resource::User))?;
    Ok(())
  }

  async fn update(&self, trip: &Trip) -> StoreResult<()> {
    let result =
      sqlx::query("UPDATE trips SET title = $2, start_date = $3, end_date = $4, updated_at = $5 WHERE id = $1")
        .bind(trip.id)
        .bind(&trip.title)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(trip.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, Resource::Trip))?;
    if result.rows_affected() == 0 {
      return Err(StoreError::RecordNotFound {
        resource: Resource::Trip,
      });
    }
    Ok(())
  }

  async fn delete(&self, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM trips WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(StoreError::RecordNotFound {
        resource: Resource::Trip,
      });
    }
    Ok(())
  }
}

#[async_trait]
impl ShareTokenRepository for PgStore {
  async fn find_by_trip(&self, trip_id: Uuid) -> StoreResult<Option<ShareCapability>> {
    let sql = format!("SELECT {} FROM trip_share_tokens WHERE trip_id = $1", SHARE_COLUMNS);
    let capability = sqlx::query_as::<_, ShareCapability>(&sql)
      .bind(trip_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(capability)
  }

  async fn find_by_hash(&self, token_hash: &str) -> StoreResult<Option<ShareCapability>> {
    let sql = format!("SELECT {} FROM trip_share_tokens WHERE token_hash = $1", SHARE_COLUMNS);
    let capability = sqlx::query_as::<_, ShareCapability>(&sql)
      .bind(token_hash)
      .fetch_optional(&self.pool)
      .await?;
    Ok(capability)
  }

  async fn insert(&self, capability: &ShareCapability) -> StoreResult<()> {
    sqlx::query("INSERT INTO trip_share_tokens (trip_id, token_hash, created_at, updated_at) VALUES ($1, $2, $3, $4)")
      .bind(capability.trip_id)
      .bind(&capability.token_hash)
      .bind(capability.created_at)
      .bind(capability.updated_at)
      .execute(&self.pool)
      .await
      .map_err(|err| map_write_error(err, Resource::Trip))?;
    Ok(())
  }

  async fn upsert(&self, trip_id: Uuid, token_hash: &str) -> StoreResult<ShareCapability> {
    let sql = format!(
      "INSERT INTO trip_share_tokens (trip_id, token_hash) VALUES ($1, $2) \
       ON CONFLICT (trip_id) DO UPDATE SET token_hash = EXCLUDED.token_hash, updated_at = NOW() \
       RETURNING {}",
      SHARE_COLUMNS
    );
    let capability = sqlx::query_as::<_, ShareCapability>(&sql)
      .bind(trip_id)
      .bind(token_hash)
      .fetch_one(&self.pool)
      .await
      .map_err(|err| map_write_error(err, Resource::Trip))?;
    Ok(capability)
  }
}

#[async_trait]
impl ScheduleRepository for PgStore {
  async fn list_by_trip(&self, trip_id: Uuid) -> StoreResult<Vec<Schedule>> {
    let sql = format!(
      "SELECT {} FROM schedules WHERE trip_id = $1 ORDER BY start_date_time, created_at",
      SCHEDULE_COLUMNS
    );
    let schedules = sqlx::query_as::<_, Schedule>(&sql)
      .bind(trip_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(schedules)
  }

  async fn find_in_trip(&self, trip_id: Uuid, schedule_id: Uuid) -> StoreResult<Option<Schedule>> {
    let sql = format!("SELECT {} FROM schedules WHERE id = $1 AND trip_id = $2", SCHEDULE_COLUMNS);
    let schedule = sqlx::query_as::<_, Schedule>(&sql)
      .bind(schedule_id)
      .bind(trip_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(schedule)
  }

  async fn create(&self, schedule: &Schedule) -> StoreResult<()> {
    sqlx::query(
      "INSERT INTO schedules (id, trip_id, title, start_date_time, end_date_time, memo, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(schedule.id)
    .bind(schedule.trip_id)
    .bind(&schedule.title)
    .bind(schedule.start_date_time)
    .bind(schedule.end_date_time)
    .bind(&schedule.memo)
    .bind(schedule.created_at)
    .bind(schedule.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|err| map_write_error(err, Resource::Trip))?;
    Ok(())
  }

  async fn update(&self, schedule: &Schedule) -> StoreResult<()> {
    let result = sqlx::query(
      "UPDATE schedules SET title = $3, start_date_time = $4, end_date_time = $5, memo = $6, updated_at = $7 \
       WHERE id = $1 AND trip_id = $2",
    )
    .bind(schedule.id)
    .bind(schedule.trip_id)
    .bind(&schedule.title)
    .bind(schedule.start_date_time)
    .bind(schedule.end_date_time)
    .bind(&schedule.memo)
    .bind(schedule.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|err| map_write_error(err, Resource::Trip))?;
    if result.rows_affected() == 0 {
      return Err(StoreError::RecordNotFound {
        resource: Resource::Schedule,
      });
    }
    Ok(())
  }

  async fn delete(&self, trip_id: Uuid, schedule_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM schedules WHERE id = $1 AND trip_id = $2")
      .bind(schedule_id)
      .bind(trip_id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(StoreError::RecordNotFound {
        resource: Resource::Schedule,
      });
    }
    Ok(())
  }
}
