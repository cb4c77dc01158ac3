// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Duration;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

use tripshare::models::{Trip, User};
use tripshare::services::credential_service::{CredentialSigner, JwtSigner};
use tripshare::services::email_sender::EmailSender;
use tripshare::services::identity_service;
use tripshare::services::secret_service::SecretService;
use tripshare::services::trip_service::{self, TripInput};
use tripshare::store::{MemoryStore, StoreResult, UserRepository};
use tripshare::validation::FieldValidator;
use tripshare::{AppConfig, AppError, AppState, Collaborators};

pub const JWT_SECRET: &str = "test-secret-test-secret-test-secret!";

/// One captured verification email.
#[derive(Debug, Clone)]
pub struct SentVerification {
  pub recipient: String,
  pub raw_token: String,
  pub raw_password: String,
}

/// Captures every verification email so tests can read the raw secrets.
#[derive(Default)]
pub struct RecordingEmailSender {
  sent: Mutex<Vec<SentVerification>>,
  failing: AtomicBool,
  delay: Mutex<Option<std::time::Duration>>,
}

impl RecordingEmailSender {
  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  pub fn set_delay(&self, delay: Option<std::time::Duration>) {
    *self.delay.lock() = delay;
  }

  pub fn sent_count(&self) -> usize {
    self.sent.lock().len()
  }

  pub fn last_for(&self, recipient: &str) -> SentVerification {
    self
      .sent
      .lock()
      .iter()
      .rev()
      .find(|s| s.recipient == recipient)
      .cloned()
      .expect("no verification email captured for recipient")
  }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
  async fn send_verification(&self, recipient: &str, raw_token: &str, raw_password: &str) -> Result<(), AppError> {
    let delay = *self.delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    if self.failing.load(Ordering::SeqCst) {
      return Err(AppError::Internal("smtp relay refused the message".to_string()));
    }
    self.sent.lock().push(SentVerification {
      recipient: recipient.to_string(),
      raw_token: raw_token.to_string(),
      raw_password: raw_password.to_string(),
    });
    Ok(())
  }
}

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "postgres://unused".to_string(),
    app_base_url: "http://localhost".to_string(),
    jwt_secret: JWT_SECRET.to_string(),
    access_token_ttl: Duration::minutes(30),
    verification_token_ttl: Duration::minutes(30),
    email_from: "noreply@tripshare.test".to_string(),
    email_send_timeout: std::time::Duration::from_millis(200),
    run_migrations: false,
  }
}

/// State wired to in-memory collaborators, with handles to poke at them.
pub struct TestApp {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
  pub mailer: Arc<RecordingEmailSender>,
}

/// Delegates to the memory store, but pauses after every verification-token
/// lookup so another request can run between the read and the write.
pub struct PausingTokenLookup {
  inner: Arc<MemoryStore>,
  pause: std::time::Duration,
}

#[async_trait]
impl UserRepository for PausingTokenLookup {
  async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
    self.inner.find_by_id(id).await
  }

  async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    self.inner.find_by_email(email).await
  }

  async fn find_by_verification_hash(&self, token_hash: &str) -> StoreResult<Option<User>> {
    let found = self.inner.find_by_verification_hash(token_hash).await;
    tokio::time::sleep(self.pause).await;
    found
  }

  async fn create(&self, user: &User) -> StoreResult<()> {
    self.inner.create(user).await
  }

  async fn update(&self, user: &User) -> StoreResult<()> {
    self.inner.update(user).await
  }

  async fn reissue_pending(&self, user: &User, previous_token_hash: &str) -> StoreResult<bool> {
    self.inner.reissue_pending(user, previous_token_hash).await
  }

  async fn activate_pending(&self, id: Uuid, token_hash: &str) -> StoreResult<Option<User>> {
    self.inner.activate_pending(id, token_hash).await
  }
}

pub fn test_app() -> TestApp {
  build_test_app(|store| store as Arc<dyn UserRepository>)
}

/// Like [`test_app`], with verification-token lookups pausing for `pause`.
pub fn test_app_with_paused_token_lookup(pause: std::time::Duration) -> TestApp {
  build_test_app(move |store| Arc::new(PausingTokenLookup { inner: store, pause }) as Arc<dyn UserRepository>)
}

fn build_test_app(users: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn UserRepository>) -> TestApp {
  setup_tracing();
  let config = test_config();
  let store = Arc::new(MemoryStore::new());
  let mailer = Arc::new(RecordingEmailSender::default());
  let collaborators = Collaborators {
    users: users(store.clone()),
    trips: store.clone(),
    schedules: store.clone(),
    share_tokens: store.clone(),
    mailer: mailer.clone(),
    signer: Arc::new(JwtSigner::new(config.jwt_secret.as_bytes(), config.access_token_ttl)),
    validator: Arc::new(FieldValidator),
    secrets: Arc::new(SecretService::default()),
  };
  TestApp {
    state: AppState::new(Arc::new(config), collaborators),
    store,
    mailer,
  }
}

impl TestApp {
  /// Signs up, verifies and logs in. Returns the user id and the `Authorization` header value.
  pub async fn active_user(&self, name: &str, email: &str) -> (Uuid, String) {
    identity_service::sign_up(&self.state, name, email).await.unwrap();
    let sent = self.mailer.last_for(email);
    identity_service::verify_email(&self.state, &sent.raw_token).await.unwrap();
    let login = identity_service::login(&self.state, email, &sent.raw_password).await.unwrap();
    (login.user.id, format!("Bearer {}", login.credential.token))
  }

  pub async fn trip_for(&self, owner_id: Uuid, title: &str) -> Trip {
    let day = chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    trip_service::create_trip(
      &self.state,
      owner_id,
      TripInput {
        title: title.to_string(),
        start_date: day,
        end_date: day + Duration::days(3),
      },
    )
    .await
    .unwrap()
  }
}

/// A credential for `principal_id` that has already expired.
pub fn expired_bearer(principal_id: Uuid) -> String {
  let signer = JwtSigner::new(JWT_SECRET.as_bytes(), Duration::minutes(-5));
  format!("Bearer {}", signer.sign(principal_id).unwrap().token)
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
