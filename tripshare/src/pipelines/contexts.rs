// tripshare/src/pipelines/contexts.rs

//! Per-run data of every pipeline. Handlers receive these wrapped in
//! `tollgate::ContextData`; input fields are set by the caller, `Option`
//! slots are filled by steps as the run progresses.
//!
//! None of these derive `Debug`: several carry raw secrets.

use crate::errors::AppError;
use crate::models::{ShareCapability, Trip, User};
use crate::services::credential_service::BearerCredential;
use crate::services::secret_service::IssuedSecret;
use crate::state::AppState;
use uuid::Uuid;

/// Reads a slot an earlier step must have filled.
pub fn filled<T: Clone>(slot: &Option<T>, name: &str) -> Result<T, AppError> {
  slot
    .clone()
    .ok_or_else(|| AppError::Internal(format!("pipeline slot '{}' was not filled by an earlier step", name)))
}

// --- Identity lifecycle ---

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub name: String,
  pub email: String,
  /// Pending account found under the same email; reissued in place.
  pub existing_pending: Option<User>,
  pub issued_token: Option<IssuedSecret>,
  pub issued_password: Option<IssuedSecret>,
  pub account: Option<User>,
  pub reactivated: bool,
}

impl SignupCtxData {
  pub fn new(app_state: AppState, name: String, email: String) -> Self {
    Self {
      app_state,
      name,
      email,
      existing_pending: None,
      issued_token: None,
      issued_password: None,
      account: None,
      reactivated: false,
    }
  }
}

#[derive(Clone)]
pub struct VerifyEmailCtxData {
  pub app_state: AppState,
  pub raw_token: String,
  pub user: Option<User>,
}

#[derive(Clone)]
pub struct LoginCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub credential: Option<BearerCredential>,
}

#[derive(Clone)]
pub struct ChangePasswordCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub current_password: String,
  pub new_password: String,
  pub user: Option<User>,
}

// --- Capability issuance ---

#[derive(Clone)]
pub struct ShareTokenCtxData {
  pub app_state: AppState,
  pub trip_id: Uuid,
  pub regenerate: bool,
  pub issued: Option<IssuedSecret>,
  pub capability: Option<ShareCapability>,
}

// --- Access gates ---

/// Which gates a request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
  /// Bearer gate only.
  Principal,
  /// Bearer gate, then ownership of the trip named in the route.
  TripOwner,
  /// Capability gate only. No principal is established.
  Capability,
}

#[derive(Clone)]
pub struct AccessCtxData {
  pub app_state: AppState,
  pub mode: AccessMode,
  pub authorization_header: Option<String>,
  pub trip_id_param: Option<String>,
  pub share_secret: Option<String>,
  pub principal_id: Option<Uuid>,
  pub trip: Option<Trip>,
}

impl AccessCtxData {
  pub fn new(app_state: AppState, mode: AccessMode) -> Self {
    Self {
      app_state,
      mode,
      authorization_header: None,
      trip_id_param: None,
      share_secret: None,
      principal_id: None,
      trip: None,
    }
  }
}
