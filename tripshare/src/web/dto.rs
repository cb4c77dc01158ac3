// tripshare/src/web/dto.rs

//! Request and response bodies. Field names are camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AccountStatus, ShareCapability, User};
use crate::services::schedule_service::{ScheduleInput, SchedulePatch};
use crate::services::trip_service::TripInput;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
  pub name: String,
  pub email: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
  pub current_password: String,
  pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
  pub title: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
}

impl From<TripRequest> for TripInput {
  fn from(req: TripRequest) -> Self {
    TripInput {
      title: req.title,
      start_date: req.start_date,
      end_date: req.end_date,
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
  pub title: String,
  pub start_date_time: DateTime<Utc>,
  pub end_date_time: DateTime<Utc>,
  #[serde(default)]
  pub memo: Option<String>,
}

impl From<ScheduleRequest> for ScheduleInput {
  fn from(req: ScheduleRequest) -> Self {
    ScheduleInput {
      title: req.title,
      start_date_time: req.start_date_time,
      end_date_time: req.end_date_time,
      memo: req.memo,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatchRequest {
  pub title: Option<String>,
  pub start_date_time: Option<DateTime<Utc>>,
  pub end_date_time: Option<DateTime<Utc>>,
  pub memo: Option<String>,
}

impl From<SchedulePatchRequest> for SchedulePatch {
  fn from(req: SchedulePatchRequest) -> Self {
    SchedulePatch {
      title: req.title,
      start_date_time: req.start_date_time,
      end_date_time: req.end_date_time,
      memo: req.memo,
    }
  }
}

/// The `{schedule_id}` route segment. Other segments of the path are ignored.
#[derive(Debug, Deserialize)]
pub struct SchedulePath {
  pub schedule_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShareQuery {
  #[serde(default)]
  pub regenerate: bool,
}

/// Public view of an account. Never carries hashes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub status: AccountStatus,
  pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
  fn from(user: &User) -> Self {
    UserResponse {
      id: user.id,
      name: user.name.clone(),
      email: user.email.clone(),
      status: user.status(),
      created_at: user.created_at,
    }
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
  pub token: String,
  pub token_type: &'static str,
  pub expires_at: DateTime<Utc>,
  pub user: UserResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTokenResponse {
  pub share_token: String,
  pub share_url: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStatusResponse {
  pub shared: bool,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl From<Option<ShareCapability>> for ShareStatusResponse {
  fn from(capability: Option<ShareCapability>) -> Self {
    ShareStatusResponse {
      shared: capability.is_some(),
      created_at: capability.as_ref().map(|c| c.created_at),
      updated_at: capability.as_ref().map(|c| c.updated_at),
    }
  }
}
