// tripshare/src/services/identity_service.rs

//! The account lifecycle: `Pending` on sign-up, `Active` after verification.

use crate::errors::{AppError, Resource};
use crate::models::User;
use crate::pipelines::contexts::{filled, ChangePasswordCtxData, LoginCtxData, SignupCtxData, VerifyEmailCtxData};
use crate::services::credential_service::BearerCredential;
use crate::services::ensure_completed;
use crate::state::AppState;
use tollgate::ContextData;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SignUpOutcome {
  pub user: User,
  /// True when an existing Pending account was overwritten.
  pub reactivated: bool,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
  pub credential: BearerCredential,
  pub user: User,
}

/// Creates a Pending account, or reissues the credentials of a Pending one,
/// and mails the raw token and initial password.
#[instrument(name = "identity::sign_up", skip(state, name))]
pub async fn sign_up(state: &AppState, name: &str, email: &str) -> Result<SignUpOutcome, AppError> {
  let ctx = ContextData::new(SignupCtxData::new(state.clone(), name.to_string(), email.to_string()));
  let result = state.tollgate.run(ctx.clone()).await?;
  ensure_completed(result, "signup")?;
  ctx.with(|c| {
    Ok(SignUpOutcome {
      user: filled(&c.account, "account")?,
      reactivated: c.reactivated,
    })
  })
}

/// Redeems a raw verification token, activating its account.
#[instrument(name = "identity::verify_email", skip_all)]
pub async fn verify_email(state: &AppState, raw_token: &str) -> Result<User, AppError> {
  let ctx = ContextData::new(VerifyEmailCtxData {
    app_state: state.clone(),
    raw_token: raw_token.to_string(),
    user: None,
  });
  let result = state.tollgate.run(ctx.clone()).await?;
  ensure_completed(result, "verify_email")?;
  ctx.with(|c| filled(&c.user, "user"))
}

#[instrument(name = "identity::login", skip(state, password))]
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
  let ctx = ContextData::new(LoginCtxData {
    app_state: state.clone(),
    email: email.to_string(),
    password: password.to_string(),
    user: None,
    credential: None,
  });
  let result = state.tollgate.run(ctx.clone()).await?;
  ensure_completed(result, "login")?;
  ctx.with(|c| {
    Ok(LoginOutcome {
      credential: filled(&c.credential, "credential")?,
      user: filled(&c.user, "user")?,
    })
  })
}

#[instrument(name = "identity::change_password", skip(state, current_password, new_password))]
pub async fn change_password(
  state: &AppState,
  user_id: Uuid,
  current_password: &str,
  new_password: &str,
) -> Result<(), AppError> {
  let ctx = ContextData::new(ChangePasswordCtxData {
    app_state: state.clone(),
    user_id,
    current_password: current_password.to_string(),
    new_password: new_password.to_string(),
    user: None,
  });
  let result = state.tollgate.run(ctx).await?;
  ensure_completed(result, "change_password")
}

pub async fn get_profile(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
  state
    .users
    .find_by_id(user_id)
    .await?
    .ok_or(AppError::NotFound(Resource::User))
}
