// tripshare/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A verification token waiting to be redeemed. Only the lookup hash is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
  pub token_hash: String,
  pub expires_at: DateTime<Utc>,
}

impl PendingVerification {
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now > self.expires_at
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
  Pending,
  Active,
}

/// An account. A user is Pending exactly while it carries a `verification`,
/// so the two token columns can never drift apart from the status.
#[derive(Debug, Clone)]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub password_hash: String,
  pub verification: Option<PendingVerification>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  /// A fresh Pending account.
  pub fn new_pending(name: String, email: String, password_hash: String, verification: PendingVerification) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name,
      email,
      password_hash,
      verification: Some(verification),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn status(&self) -> AccountStatus {
    if self.verification.is_some() {
      AccountStatus::Pending
    } else {
      AccountStatus::Active
    }
  }

  pub fn is_active(&self) -> bool {
    self.status() == AccountStatus::Active
  }

  /// Overwrites the pending credentials in place (re-signup while Pending).
  pub fn reissue_pending(&mut self, name: String, password_hash: String, verification: PendingVerification) {
    self.name = name;
    self.password_hash = password_hash;
    self.verification = Some(verification);
    self.updated_at = Utc::now();
  }

  /// Pending -> Active. Clears the token so it can never be redeemed twice.
  pub fn activate(&mut self) {
    self.verification = None;
    self.updated_at = Utc::now();
  }

  pub fn replace_password_hash(&mut self, password_hash: String) {
    self.password_hash = password_hash;
    self.updated_at = Utc::now();
  }
}
