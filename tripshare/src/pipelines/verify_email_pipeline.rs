// tripshare/src/pipelines/verify_email_pipeline.rs

//! Redeems a verification token. Tokens are single-use: activation clears the
//! stored hash, so a repeated redemption no longer finds an account.
//!
//! Activation is a conditional write on the looked-up hash. Of two concurrent
//! redemptions only one activates, and a re-signup that replaced the token in
//! the meantime wins over the stale redemption.

use crate::errors::AppError;
use crate::pipelines::contexts::{filled, VerifyEmailCtxData};
use crate::services::auth_service;
use chrono::Utc;
use std::sync::Arc;
use tollgate::{ContextData, Pipeline, PipelineControl, Tollgate};
use tracing::{info, warn};

pub fn register_verify_email_pipeline(tollgate: &Arc<Tollgate<AppError>>) {
  let mut verify_p = Pipeline::<VerifyEmailCtxData, AppError>::new(&[
    ("find_pending_by_token", false, None),
    ("check_token_expiry", false, None),
    ("activate_account", false, None),
  ]);

  verify_p.on_root("find_pending_by_token", find_pending_by_token);
  verify_p.on_root("check_token_expiry", check_token_expiry);
  verify_p.on_root("activate_account", activate_account);

  tollgate.register_pipeline(verify_p);
  info!("Email verification pipeline registered.");
}

async fn find_pending_by_token(ctx_data: ContextData<VerifyEmailCtxData>) -> Result<PipelineControl, AppError> {
  let (users, raw_token) = ctx_data.with(|c| (c.app_state.users.clone(), c.raw_token.clone()));
  if raw_token.is_empty() {
    return Err(AppError::InvalidToken);
  }

  let token_hash = auth_service::hash_for_lookup(&raw_token);
  match users.find_by_verification_hash(&token_hash).await? {
    Some(user) => {
      ctx_data.update(|c| c.user = Some(user));
      Ok(PipelineControl::Continue)
    }
    None => Err(AppError::InvalidToken),
  }
}

async fn check_token_expiry(ctx_data: ContextData<VerifyEmailCtxData>) -> Result<PipelineControl, AppError> {
  let user = ctx_data.with(|c| filled(&c.user, "user"))?;
  let expired = user
    .verification
    .as_ref()
    .map_or(true, |pending| pending.is_expired_at(Utc::now()));
  if expired {
    // The account stays Pending with its token untouched.
    warn!(user_id = %user.id, "Expired verification token presented.");
    return Err(AppError::TokenExpired);
  }
  Ok(PipelineControl::Continue)
}

async fn activate_account(ctx_data: ContextData<VerifyEmailCtxData>) -> Result<PipelineControl, AppError> {
  let (users, user) = ctx_data.with(|c| (c.app_state.users.clone(), filled(&c.user, "user")));
  let user = user?;
  let token_hash = user
    .verification
    .as_ref()
    .map(|pending| pending.token_hash.clone())
    .ok_or(AppError::InvalidToken)?;

  match users.activate_pending(user.id, &token_hash).await? {
    Some(activated) => {
      info!(user_id = %activated.id, "Account activated.");
      ctx_data.update(|c| c.user = Some(activated));
      Ok(PipelineControl::Continue)
    }
    None => {
      warn!(user_id = %user.id, "Verification token was redeemed or replaced concurrently.");
      Err(AppError::InvalidToken)
    }
  }
}
