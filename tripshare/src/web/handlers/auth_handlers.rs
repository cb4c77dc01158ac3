// tripshare/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::identity_service;
use crate::state::AppState;
use crate::web::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, SignupRequest, UserResponse};
use crate::web::extractors::Authenticated;

#[instrument(name = "handler::signup", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
  let outcome = identity_service::sign_up(&app_state, &req_payload.name, &req_payload.email).await?;
  info!(user_id = %outcome.user.id, reactivated = outcome.reactivated, "Sign-up accepted.");

  Ok(HttpResponse::Created().json(json!({
    "message": "Account created. Check your email to verify it.",
    "user": UserResponse::from(&outcome.user),
  })))
}

#[instrument(name = "handler::verify_email", skip_all)]
pub async fn verify_email_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let raw_token = path.into_inner();
  identity_service::verify_email(&app_state, &raw_token).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": "Email verified successfully. You can now log in.",
  })))
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
  let outcome = identity_service::login(&app_state, &req_payload.email, &req_payload.password).await?;
  Ok(HttpResponse::Ok().json(LoginResponse {
    token: outcome.credential.token,
    token_type: "Bearer",
    expires_at: outcome.credential.expires_at,
    user: UserResponse::from(&outcome.user),
  }))
}

#[instrument(name = "handler::change_password", skip(app_state, req_payload), fields(user_id = %auth.principal_id))]
pub async fn change_password_handler(
  app_state: web::Data<AppState>,
  auth: Authenticated,
  req_payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
  identity_service::change_password(
    &app_state,
    auth.principal_id,
    &req_payload.current_password,
    &req_payload.new_password,
  )
  .await?;
  Ok(HttpResponse::NoContent().finish())
}

pub async fn me_handler(app_state: web::Data<AppState>, auth: Authenticated) -> Result<HttpResponse, AppError> {
  let user = identity_service::get_profile(&app_state, auth.principal_id).await?;
  Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// Credentials are stateless; the client simply discards its token.
pub async fn logout_handler(auth: Authenticated) -> HttpResponse {
  info!(user_id = %auth.principal_id, "Logout acknowledged.");
  HttpResponse::NoContent().finish()
}
