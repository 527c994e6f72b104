//! Password verification using Argon2id.

use argon2::password_hash::Error as HashError;
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use crate::error::AuthError;

/// Verify a plaintext password against a PHC-format Argon2id hash.
///
/// `pepper` must match the one the credential store hashed with.
/// A stored hash that cannot be parsed is a [`AuthError::Crypto`].
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let outcome = match pepper {
        Some(p) => Argon2::default().verify_password(format!("{p}{password}").as_bytes(), &parsed),
        None => Argon2::default().verify_password(password.as_bytes(), &parsed),
    };

    match outcome {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}
