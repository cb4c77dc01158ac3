// tripshare/src/pipelines/login_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::{filled, LoginCtxData};
use crate::services::auth_service;
use std::sync::Arc;
use tollgate::{ContextData, Pipeline, PipelineControl, Tollgate};
use tracing::{event, info, warn, Level};

pub fn register_login_pipeline(tollgate: &Arc<Tollgate<AppError>>) {
  let mut login_p = Pipeline::<LoginCtxData, AppError>::new(&[
    ("validate_login_input", false, None),
    ("fetch_account_by_email", false, None),
    ("ensure_account_active", false, None),
    ("verify_account_password", false, None),
    ("issue_bearer_credential", false, None),
  ]);

  login_p.on_root("validate_login_input", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (validator, email, password) =
        ctx_data.with(|c| (c.app_state.validator.clone(), c.email.clone(), c.password.clone()));
      validator.validate_login(&email, &password)?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  login_p.on_root("fetch_account_by_email", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (users, email) = ctx_data.with(|c| (c.app_state.users.clone(), c.email.clone()));
      match users.find_by_email(&email).await? {
        Some(user) => {
          ctx_data.update(|c| c.user = Some(user));
          Ok(PipelineControl::Continue)
        }
        None => {
          event!(Level::DEBUG, "Login for an unknown email.");
          Err(AppError::InvalidCredentials)
        }
      }
    })
  });

  // Runs before the password check, so a pending account learns it must
  // verify first even with a wrong password. Kept on purpose; see AppError::NotActive.
  login_p.on_root("ensure_account_active", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let user = ctx_data.with(|c| filled(&c.user, "user"))?;
      if !user.is_active() {
        warn!(user_id = %user.id, "Login attempted on a pending account.");
        return Err(AppError::NotActive);
      }
      Ok(PipelineControl::Continue)
    })
  });

  login_p.on_root("verify_account_password", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (user, password) = ctx_data.with(|c| (filled(&c.user, "user"), c.password.clone()));
      let user = user?;
      if auth_service::verify_password(&user.password_hash, &password)? {
        Ok(PipelineControl::Continue)
      } else {
        warn!(user_id = %user.id, "Password mismatch on login.");
        Err(AppError::InvalidCredentials)
      }
    })
  });

  login_p.on_root("issue_bearer_credential", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (signer, user) = ctx_data.with(|c| (c.app_state.signer.clone(), filled(&c.user, "user")));
      let user = user?;
      let credential = signer.sign(user.id)?;
      info!(user_id = %user.id, expires_at = %credential.expires_at, "Bearer credential issued.");
      ctx_data.update(|c| c.credential = Some(credential));
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  tollgate.register_pipeline(login_p);
  info!("Login pipeline registered.");
}
