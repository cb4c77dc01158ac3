// tripshare/src/services/secret_service.rs

use crate::errors::AppError;
use crate::services::auth_service;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand_core::{OsRng, RngCore};
use std::fmt;

/// Entropy of verification tokens and share secrets.
pub const TOKEN_BYTES: usize = 32;
/// Entropy of the generated initial password.
pub const INITIAL_PASSWORD_BYTES: usize = 12;

/// Source of secret bytes. Must be cryptographically secure.
pub trait RandomSource: Send + Sync {
  fn fill(&self, dest: &mut [u8]) -> Result<(), AppError>;
}

/// The operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
  fn fill(&self, dest: &mut [u8]) -> Result<(), AppError> {
    OsRng
      .try_fill_bytes(dest)
      .map_err(|e| AppError::Internal(format!("random source failed: {}", e)))
  }
}

/// A raw secret paired with the hash that gets persisted.
///
/// `raw` is handed to its caller once and never stored.
#[derive(Clone)]
pub struct IssuedSecret {
  pub raw: String,
  pub hash: String,
}

impl fmt::Debug for IssuedSecret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("IssuedSecret")
      .field("raw", &"[REDACTED]")
      .field("hash", &self.hash)
      .finish()
  }
}

pub struct SecretService {
  random: Box<dyn RandomSource>,
}

impl Default for SecretService {
  fn default() -> Self {
    Self::new(Box::new(OsRandom))
  }
}

impl SecretService {
  pub fn new(random: Box<dyn RandomSource>) -> Self {
    Self { random }
  }

  /// `byte_len` random bytes, URL-safe base64 without padding.
  pub fn generate_secret(&self, byte_len: usize) -> Result<String, AppError> {
    let mut bytes = vec![0u8; byte_len];
    self.random.fill(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
  }

  /// A lookup secret (verification token or share link) with its SHA-256 hash.
  pub fn issue_token(&self) -> Result<IssuedSecret, AppError> {
    let raw = self.generate_secret(TOKEN_BYTES)?;
    let hash = auth_service::hash_for_lookup(&raw);
    Ok(IssuedSecret { raw, hash })
  }

  /// A generated password with its Argon2 hash.
  pub fn issue_initial_password(&self) -> Result<IssuedSecret, AppError> {
    let raw = self.generate_secret(INITIAL_PASSWORD_BYTES)?;
    let hash = auth_service::hash_password(&raw)?;
    Ok(IssuedSecret { raw, hash })
  }
}
