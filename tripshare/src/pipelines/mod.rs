// tripshare/src/pipelines/mod.rs

//! Every identity, capability and authorization workflow, defined as a
//! `tollgate` pipeline and registered once at startup.

use crate::errors::AppError;
use std::sync::Arc;
use tollgate::Tollgate;

pub mod contexts;

pub mod access_pipeline;
pub mod change_password_pipeline;
pub mod login_pipeline;
pub mod share_token_pipeline;
pub mod signup_pipeline;
pub mod verify_email_pipeline;

pub fn register_all_pipelines(tollgate: &Arc<Tollgate<AppError>>) {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(tollgate);
  verify_email_pipeline::register_verify_email_pipeline(tollgate);
  login_pipeline::register_login_pipeline(tollgate);
  change_password_pipeline::register_change_password_pipeline(tollgate);
  share_token_pipeline::register_share_token_pipeline(tollgate);
  access_pipeline::register_access_pipeline(tollgate);

  tracing::info!("All application pipelines registered.");
}
