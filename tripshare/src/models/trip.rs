// tripshare/src/models/trip.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
  pub id: Uuid,
  pub owner_id: Uuid,
  pub title: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Trip {
  pub fn new(owner_id: Uuid, title: String, start_date: NaiveDate, end_date: NaiveDate) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      owner_id,
      title,
      start_date,
      end_date,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_owned_by(&self, principal_id: Uuid) -> bool {
    self.owner_id == principal_id
  }
}
