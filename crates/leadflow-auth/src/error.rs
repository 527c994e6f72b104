//! Authentication error types.

use leadflow_core::error::LeadflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token")]
    TokenInvalid,

    #[error("Invalid or expired OTP")]
    OtpInvalid,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for LeadflowError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::TokenInvalid => {
                LeadflowError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::OtpInvalid => LeadflowError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => LeadflowError::Crypto(msg),
        }
    }
}
