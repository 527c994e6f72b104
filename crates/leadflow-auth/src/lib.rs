//! Leadflow Auth: password verification, JWT issuance/validation,
//! login, the OTP password-reset flow and the route access rules.

pub mod access;
pub mod config;
pub mod error;
pub mod password;
pub mod reset;
pub mod service;
pub mod token;

pub use access::{Access, authorize, required_access};
pub use config::AuthConfig;
pub use error::AuthError;
pub use reset::{OtpStore, PasswordResetService, ResetPasswordInput, ResetTicket, mask_email};
pub use service::{AuthService, LoginInput, LoginOutput};
pub use token::AccessTokenClaims;
