// tripshare/src/models/schedule.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One entry of a trip's itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
  pub id: Uuid,
  pub trip_id: Uuid,
  pub title: String,
  pub start_date_time: DateTime<Utc>,
  pub end_date_time: DateTime<Utc>,
  pub memo: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Schedule {
  pub fn new(
    trip_id: Uuid,
    title: String,
    start_date_time: DateTime<Utc>,
    end_date_time: DateTime<Utc>,
    memo: String,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      trip_id,
      title,
      start_date_time,
      end_date_time,
      memo,
      created_at: now,
      updated_at: now,
    }
  }
}
