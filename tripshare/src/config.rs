// tripshare/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;

const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub app_base_url: String,

  /// Shared HS256 key for bearer credentials.
  pub jwt_secret: String,
  pub access_token_ttl: chrono::Duration,
  pub verification_token_ttl: chrono::Duration,

  pub email_from: String,
  pub email_send_timeout: std::time::Duration,

  pub run_migrations: bool,
}

impl fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("app_base_url", &self.app_base_url)
      .field("jwt_secret", &"[REDACTED]")
      .field("access_token_ttl", &self.access_token_ttl)
      .field("verification_token_ttl", &self.verification_token_ttl)
      .field("email_from", &self.email_from)
      .field("email_send_timeout", &self.email_send_timeout)
      .field("run_migrations", &self.run_migrations)
      .finish()
  }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  match lookup(var_name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    None => Ok(default),
  }
}

impl AppConfig {
  /// Reads the process environment, after loading `.env` when present.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the configuration from any key lookup.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let require = |var_name: &str| {
      lookup(var_name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };

    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(&lookup, "SERVER_PORT", 8080u16)?;
    let database_url = require("DATABASE_URL")?;
    let app_base_url = lookup("APP_BASE_URL").unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));

    let jwt_secret = require("JWT_SECRET")?;
    if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
      return Err(AppError::Config(format!(
        "JWT_SECRET must be at least {} bytes long",
        MIN_JWT_SECRET_BYTES
      )));
    }

    let access_minutes = parse_or(&lookup, "ACCESS_TOKEN_TTL_MINUTES", 30i64)?;
    let verification_minutes = parse_or(&lookup, "VERIFICATION_TOKEN_TTL_MINUTES", 30i64)?;
    if access_minutes <= 0 || verification_minutes <= 0 {
      return Err(AppError::Config("Token lifetimes must be positive".to_string()));
    }

    let email_from = lookup("EMAIL_FROM").unwrap_or_else(|| "noreply@tripshare.local".to_string());
    let email_timeout_ms = parse_or(&lookup, "EMAIL_SEND_TIMEOUT_MS", 5000u64)?;
    let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", false)?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      jwt_secret,
      access_token_ttl: chrono::Duration::minutes(access_minutes),
      verification_token_ttl: chrono::Duration::minutes(verification_minutes),
      email_from,
      email_send_timeout: std::time::Duration::from_millis(email_timeout_ms),
      run_migrations,
    })
  }
}
