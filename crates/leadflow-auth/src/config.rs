//! Authentication configuration.

use serde::Deserialize;

/// Configuration for the authentication and password-reset services.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 secret for signing and verifying access tokens.
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Access token lifetime in seconds (default: 1800 = 30 minutes).
    pub access_token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Minimum length accepted by the password reset.
    pub min_password_length: usize,
    /// Lifetime of a reset code in seconds (default: 600 = 10 minutes).
    pub otp_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "leadflow".into(),
            access_token_lifetime_secs: 1800,
            pepper: None,
            min_password_length: 4,
            otp_lifetime_secs: 600,
        }
    }
}
