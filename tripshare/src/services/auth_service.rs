// tripshare/src/services/auth_service.rs

//! The two hashing disciplines.
//!
//! Passwords go through Argon2 with a fresh salt per call, so equal inputs
//! never produce equal hashes and the result can only be *verified*.
//! Lookup secrets (verification tokens, share links) go through SHA-256,
//! which is deterministic and can therefore be used in an equality query.
//! Never swap the two.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use sha2::{Digest, Sha256};
use tracing::{debug, error, instrument};

/// Hashes a password with Argon2 and a random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Internal("refusing to hash an empty password".to_string()));
  }
  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => Ok(hash.to_string()),
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Checks `provided_password` against a stored Argon2 hash.
///
/// A mismatch is `Ok(false)`; only a malformed hash or an Argon2 failure is an error.
#[instrument(
  name = "auth_service::verify_password",
  skip(stored_hash, provided_password),
  err(Display),
  fields(hash_len = stored_hash.len())
)]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// Deterministic hex SHA-256 of a lookup secret.
pub fn hash_for_lookup(raw_secret: &str) -> String {
  hex::encode(Sha256::digest(raw_secret.as_bytes()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_hash_verifies_and_rejects() {
    let hash = hash_password("correct-password").unwrap();
    assert!(verify_password(&hash, "correct-password").unwrap());
    assert!(!verify_password(&hash, "wrong-password").unwrap());
  }

  #[test]
  fn password_hashes_are_salted() {
    let first = hash_password("same-password").unwrap();
    let second = hash_password("same-password").unwrap();
    assert_ne!(first, second);
  }

  #[test]
  fn lookup_hash_is_deterministic_and_not_a_password_hash() {
    let raw = "fixed-token-value";
    assert_eq!(hash_for_lookup(raw), hash_for_lookup(raw));
    assert_eq!(hash_for_lookup(raw).len(), 64);
    // A lookup hash is not a PHC string, so it can never pass as a stored password.
    assert!(verify_password(&hash_for_lookup(raw), raw).is_err());
  }

  #[test]
  fn malformed_stored_hash_is_internal() {
    let err = verify_password("not-a-phc-string", "whatever").unwrap_err();
    assert!(err.is_internal());
  }
}
