// tripshare/src/pipelines/signup_pipeline.rs

//! Sign-up and reactivation.
//!
//! A fresh email creates a Pending account. A Pending account under the same
//! email is overwritten in place (new name, new password, new token), which
//! invalidates the previously mailed token. An Active account is a conflict.
//!
//! The account write commits before the email goes out. If dispatch fails the
//! write stays, and the caller gets an internal error.

use crate::errors::AppError;
use crate::models::{PendingVerification, User};
use crate::pipelines::contexts::{filled, SignupCtxData};
use crate::store::StoreError;
use chrono::Utc;
use std::sync::Arc;
use tollgate::{ContextData, Pipeline, PipelineControl, Tollgate};
use tracing::{event, info, instrument, warn, Level};

pub fn register_signup_pipeline(tollgate: &Arc<Tollgate<AppError>>) {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("lookup_existing_account", false, None),
    ("issue_pending_credentials", false, None),
    ("persist_pending_account", false, None),
    ("dispatch_verification_email", false, None),
  ]);

  signup_p.on_root("validate_signup_input", validate_signup_input);
  signup_p.on_root("lookup_existing_account", lookup_existing_account);
  signup_p.on_root("issue_pending_credentials", issue_pending_credentials);
  signup_p.on_root("persist_pending_account", persist_pending_account);
  signup_p.on_root("dispatch_verification_email", dispatch_verification_email);

  tollgate.register_pipeline(signup_p);
  info!("Sign-up pipeline registered.");
}

async fn validate_signup_input(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (validator, name, email) = ctx_data.with(|c| (c.app_state.validator.clone(), c.name.clone(), c.email.clone()));
  validator.validate_sign_up(&name, &email)?;
  ctx_data.update(|c| c.name = name.trim().to_string());
  Ok(PipelineControl::Continue)
}

async fn lookup_existing_account(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (users, email) = ctx_data.with(|c| (c.app_state.users.clone(), c.email.clone()));

  match users.find_by_email(&email).await? {
    None => Ok(PipelineControl::Continue),
    Some(user) if user.is_active() => {
      warn!(user_id = %user.id, "Sign-up attempted for an active account.");
      Err(AppError::EmailConflict)
    }
    Some(user) => {
      event!(Level::DEBUG, user_id = %user.id, "Pending account found; reissuing credentials.");
      ctx_data.update(|c| c.existing_pending = Some(user));
      Ok(PipelineControl::Continue)
    }
  }
}

async fn issue_pending_credentials(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let secrets = ctx_data.with(|c| c.app_state.secrets.clone());
  let token = secrets.issue_token()?;
  let password = secrets.issue_initial_password()?;
  ctx_data.update(|c| {
    c.issued_token = Some(token);
    c.issued_password = Some(password);
  });
  Ok(PipelineControl::Continue)
}

#[instrument(name = "signup::persist_pending_account", skip(ctx_data), err(Display))]
async fn persist_pending_account(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (users, ttl, name, email, existing, token, password) = ctx_data.with(|c| {
    (
      c.app_state.users.clone(),
      c.app_state.config.verification_token_ttl,
      c.name.clone(),
      c.email.clone(),
      c.existing_pending.clone(),
      filled(&c.issued_token, "issued_token"),
      filled(&c.issued_password, "issued_password"),
    )
  });
  let (token, password) = (token?, password?);

  let verification = PendingVerification {
    token_hash: token.hash,
    expires_at: Utc::now() + ttl,
  };

  let (account, reactivated) = match existing {
    Some(mut user) => {
      let previous_hash = user
        .verification
        .as_ref()
        .map(|pending| pending.token_hash.clone())
        .ok_or(AppError::EmailConflict)?;
      user.reissue_pending(name, password.hash, verification);
      // Refused when the account was activated or reissued since the lookup.
      if !users.reissue_pending(&user, &previous_hash).await.map_err(conflict_on_unique)? {
        warn!(user_id = %user.id, "Pending account changed during sign-up.");
        return Err(AppError::EmailConflict);
      }
      (user, true)
    }
    None => {
      let user = User::new_pending(name, email, password.hash, verification);
      users.create(&user).await.map_err(conflict_on_unique)?;
      (user, false)
    }
  };

  info!(user_id = %account.id, reactivated, "Pending account stored.");
  ctx_data.update(|c| {
    c.account = Some(account);
    c.reactivated = reactivated;
  });
  Ok(PipelineControl::Continue)
}

/// A unique violation here means a concurrent sign-up for the same email won.
fn conflict_on_unique(err: StoreError) -> AppError {
  match err {
    StoreError::UniqueViolation { .. } => AppError::EmailConflict,
    other => AppError::from(other),
  }
}

async fn dispatch_verification_email(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (mailer, timeout, email, token, password) = ctx_data.with(|c| {
    (
      c.app_state.mailer.clone(),
      c.app_state.config.email_send_timeout,
      c.email.clone(),
      filled(&c.issued_token, "issued_token"),
      filled(&c.issued_password, "issued_password"),
    )
  });
  let (token, password) = (token?, password?);

  match tokio::time::timeout(timeout, mailer.send_verification(&email, &token.raw, &password.raw)).await {
    Ok(Ok(())) => Ok(PipelineControl::Continue),
    Ok(Err(err)) => {
      event!(Level::ERROR, error = %err, "Verification email failed after the account was stored.");
      Err(AppError::Internal(format!("verification email dispatch failed: {}", err)))
    }
    Err(_) => {
      event!(Level::ERROR, timeout_ms = timeout.as_millis() as u64, "Verification email timed out after the account was stored.");
      Err(AppError::Internal("verification email dispatch timed out".to_string()))
    }
  }
}
