// tripshare/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::credential_service::{CredentialSigner, JwtSigner};
use crate::services::email_sender::{EmailSender, LogEmailSender};
use crate::services::secret_service::SecretService;
use crate::store::{PgStore, ScheduleRepository, ShareTokenRepository, TripRepository, UserRepository};
use crate::validation::{FieldValidator, InputValidator};
use sqlx::PgPool;
use std::sync::Arc;
use tollgate::Tollgate;

/// The injected collaborators. Each must tolerate concurrent use on its own.
pub struct Collaborators {
  pub users: Arc<dyn UserRepository>,
  pub trips: Arc<dyn TripRepository>,
  pub schedules: Arc<dyn ScheduleRepository>,
  pub share_tokens: Arc<dyn ShareTokenRepository>,
  pub mailer: Arc<dyn EmailSender>,
  pub signer: Arc<dyn CredentialSigner>,
  pub validator: Arc<dyn InputValidator>,
  pub secrets: Arc<SecretService>,
}

impl Collaborators {
  /// Production wiring: Postgres, HS256 signer, log mailer, OS randomness.
  pub fn production(config: &AppConfig, pool: PgPool) -> Self {
    let store = Arc::new(PgStore::new(pool));
    Self {
      users: store.clone(),
      trips: store.clone(),
      schedules: store.clone(),
      share_tokens: store,
      mailer: Arc::new(LogEmailSender::new(config.email_from.clone(), config.app_base_url.clone())),
      signer: Arc::new(JwtSigner::new(config.jwt_secret.as_bytes(), config.access_token_ttl)),
      validator: Arc::new(FieldValidator),
      secrets: Arc::new(SecretService::default()),
    }
  }
}

#[derive(Clone)]
pub struct AppState {
  pub users: Arc<dyn UserRepository>,
  pub trips: Arc<dyn TripRepository>,
  pub schedules: Arc<dyn ScheduleRepository>,
  pub share_tokens: Arc<dyn ShareTokenRepository>,
  pub mailer: Arc<dyn EmailSender>,
  pub signer: Arc<dyn CredentialSigner>,
  pub validator: Arc<dyn InputValidator>,
  pub secrets: Arc<SecretService>,
  pub tollgate: Arc<Tollgate<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Assembles the state and registers every pipeline on a fresh registry.
  pub fn new(config: Arc<AppConfig>, collaborators: Collaborators) -> Self {
    let tollgate = Arc::new(Tollgate::<AppError>::new());
    pipelines::register_all_pipelines(&tollgate);
    Self {
      users: collaborators.users,
      trips: collaborators.trips,
      schedules: collaborators.schedules,
      share_tokens: collaborators.share_tokens,
      mailer: collaborators.mailer,
      signer: collaborators.signer,
      validator: collaborators.validator,
      secrets: collaborators.secrets,
      tollgate,
      config,
    }
  }
}
