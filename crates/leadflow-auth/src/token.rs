//! HS256 JWT access token issuance and verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject: the username.
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

fn secret(config: &AuthConfig) -> Result<&[u8], AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret is not configured".into()));
    }
    Ok(config.jwt_secret.as_bytes())
}

/// Issue a signed access token for `username`, valid from now.
pub fn issue_access_token(username: &str, config: &AuthConfig) -> Result<String, AuthError> {
    issue_access_token_at(username, Utc::now(), config)
}

/// Issue a signed access token as if it were issued at `issued_at`.
pub fn issue_access_token_at(
    username: &str,
    issued_at: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let iat = issued_at.timestamp();
    let claims = AccessTokenClaims {
        sub: username.to_string(),
        iss: config.jwt_issuer.clone(),
        iat,
        exp: iat + config.access_token_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(secret(config)?);
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an access token: signature, issuer and expiry,
/// with no leeway.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret(config)?);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => {
                tracing::debug!(error = %e, "access token rejected");
                AuthError::TokenInvalid
            }
        })
}

/// Verify a token and return its subject username.
pub fn verify_access_token(token: &str, config: &AuthConfig) -> Result<String, AuthError> {
    decode_access_token(token, config).map(|claims| claims.sub)
}
