// tripshare/src/models/share_token.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The single share capability of a trip. The raw secret is never stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShareCapability {
  pub trip_id: Uuid,
  pub token_hash: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ShareCapability {
  pub fn new(trip_id: Uuid, token_hash: String) -> Self {
    let now = Utc::now();
    Self {
      trip_id,
      token_hash,
      created_at: now,
      updated_at: now,
    }
  }
}
