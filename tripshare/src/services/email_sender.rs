// tripshare/src/services/email_sender.rs

use crate::errors::AppError;
use async_trait::async_trait;
use tracing::{event, info, instrument, Level};

/// Delivers the verification mail carrying the raw token and raw initial password.
///
/// Implementations must return in bounded time; callers additionally wrap the
/// call in a timeout. A failure never undoes the account write that preceded it.
#[async_trait]
pub trait EmailSender: Send + Sync {
  async fn send_verification(&self, recipient: &str, raw_token: &str, raw_password: &str) -> Result<(), AppError>;
}

/// Development sender: logs the envelope at INFO and the rendered body under
/// the `tripshare::outbox` target at TRACE, which is off unless asked for.
#[derive(Debug, Clone)]
pub struct LogEmailSender {
  from: String,
  app_base_url: String,
}

impl LogEmailSender {
  pub fn new(from: impl Into<String>, app_base_url: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      app_base_url: app_base_url.into(),
    }
  }

  fn render_body(&self, raw_token: &str, raw_password: &str) -> String {
    format!(
      "Welcome!\n\nConfirm your address: POST {}/users/verify/{}\nYour initial password: {}\n\nThe link expires in 30 minutes.",
      self.app_base_url.trim_end_matches('/'),
      raw_token,
      raw_password
    )
  }
}

#[async_trait]
impl EmailSender for LogEmailSender {
  #[instrument(name = "email::send_verification", skip(self, raw_token, raw_password))]
  async fn send_verification(&self, recipient: &str, raw_token: &str, raw_password: &str) -> Result<(), AppError> {
    let body = self.render_body(raw_token, raw_password);
    event!(target: "tripshare::outbox", Level::TRACE, to = recipient, %body, "Rendered verification email.");
    info!(to = recipient, from = %self.from, subject = "Verify your email", "Verification email dispatched.");
    Ok(())
  }
}
