// tripshare/src/services/credential_service.rs

use crate::errors::AppError;
use chrono::{DateTime, Duration, Timelike, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};
use uuid::Uuid;

/// A signed, self-contained access credential. Never persisted.
#[derive(Clone)]
pub struct BearerCredential {
  pub token: String,
  pub principal_id: Uuid,
  pub issued_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for BearerCredential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BearerCredential")
      .field("token", &"[REDACTED]")
      .field("principal_id", &self.principal_id)
      .field("issued_at", &self.issued_at)
      .field("expires_at", &self.expires_at)
      .finish()
  }
}

pub trait CredentialSigner: Send + Sync {
  fn sign(&self, principal_id: Uuid) -> Result<BearerCredential, AppError>;
  /// Returns the principal of a valid, unexpired credential, `Unauthenticated` otherwise.
  fn verify(&self, token: &str) -> Result<Uuid, AppError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub: String,
  iat: i64,
  exp: i64,
}

/// HS256 signer over a shared secret.
pub struct JwtSigner {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  ttl: Duration,
}

impl JwtSigner {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret),
      decoding_key: DecodingKey::from_secret(secret),
      ttl,
    }
  }

  fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
  }
}

impl CredentialSigner for JwtSigner {
  #[instrument(name = "credential::sign", skip(self))]
  fn sign(&self, principal_id: Uuid) -> Result<BearerCredential, AppError> {
    // JWT timestamps have whole-second precision.
    let now = Utc::now();
    let issued_at = now.with_nanosecond(0).unwrap_or(now);
    let expires_at = issued_at + self.ttl;
    let claims = Claims {
      sub: principal_id.to_string(),
      iat: issued_at.timestamp(),
      exp: expires_at.timestamp(),
    };
    let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| AppError::Internal(format!("failed to sign bearer credential: {}", e)))?;
    Ok(BearerCredential {
      token,
      principal_id,
      issued_at,
      expires_at,
    })
  }

  fn verify(&self, token: &str) -> Result<Uuid, AppError> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Self::validation()).map_err(|e| {
      debug!(reason = %e, "Bearer credential rejected.");
      AppError::Unauthenticated
    })?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthenticated)
  }
}
