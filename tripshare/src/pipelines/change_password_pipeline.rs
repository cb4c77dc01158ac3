// tripshare/src/pipelines/change_password_pipeline.rs

//! Replaces a password hash. Bearer credentials issued earlier stay valid
//! until they expire; nothing is revoked.

use crate::errors::{AppError, Resource};
use crate::pipelines::contexts::{filled, ChangePasswordCtxData};
use crate::services::auth_service;
use std::sync::Arc;
use tollgate::{ContextData, Pipeline, PipelineControl, Tollgate};
use tracing::{info, instrument, warn};

pub fn register_change_password_pipeline(tollgate: &Arc<Tollgate<AppError>>) {
  let mut change_p = Pipeline::<ChangePasswordCtxData, AppError>::new(&[
    ("validate_password_change", false, None),
    ("fetch_account_by_id", false, None),
    ("verify_current_password", false, None),
    ("store_new_password_hash", false, None),
  ]);

  change_p.on_root("validate_password_change", validate_password_change);
  change_p.on_root("fetch_account_by_id", fetch_account_by_id);
  change_p.on_root("verify_current_password", verify_current_password);
  change_p.on_root("store_new_password_hash", store_new_password_hash);

  tollgate.register_pipeline(change_p);
  info!("Change-password pipeline registered.");
}

async fn validate_password_change(ctx_data: ContextData<ChangePasswordCtxData>) -> Result<PipelineControl, AppError> {
  let (validator, current, new) = ctx_data.with(|c| {
    (
      c.app_state.validator.clone(),
      c.current_password.clone(),
      c.new_password.clone(),
    )
  });
  validator.validate_change_password(&current, &new)?;
  Ok(PipelineControl::Continue)
}

async fn fetch_account_by_id(ctx_data: ContextData<ChangePasswordCtxData>) -> Result<PipelineControl, AppError> {
  let (users, user_id) = ctx_data.with(|c| (c.app_state.users.clone(), c.user_id));
  let user = users.find_by_id(user_id).await?.ok_or(AppError::NotFound(Resource::User))?;
  ctx_data.update(|c| c.user = Some(user));
  Ok(PipelineControl::Continue)
}

async fn verify_current_password(ctx_data: ContextData<ChangePasswordCtxData>) -> Result<PipelineControl, AppError> {
  let (user, current) = ctx_data.with(|c| (filled(&c.user, "user"), c.current_password.clone()));
  let user = user?;
  if !auth_service::verify_password(&user.password_hash, &current)? {
    warn!(user_id = %user.id, "Current password did not match.");
    return Err(AppError::IncorrectPassword);
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "change_password::store_new_password_hash", skip(ctx_data), err(Display))]
async fn store_new_password_hash(ctx_data: ContextData<ChangePasswordCtxData>) -> Result<PipelineControl, AppError> {
  let (users, user, new) = ctx_data.with(|c| (c.app_state.users.clone(), filled(&c.user, "user"), c.new_password.clone()));
  let mut user = user?;
  user.replace_password_hash(auth_service::hash_password(&new)?);
  users.update(&user).await?;
  info!(user_id = %user.id, "Password changed.");
  ctx_data.update(|c| c.user = Some(user));
  Ok(PipelineControl::Continue)
}
