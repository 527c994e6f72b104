//! OTP-based password reset.
//!
//! Pending codes live only in process memory, one per username. A new
//! request overwrites the previous code; expired codes are evicted when
//! they are next looked up.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use leadflow_core::error::{LeadflowError, LeadflowResult};
use leadflow_core::repository::UserRepository;
use rand::Rng;
use tracing::info;

use crate::config::AuthConfig;
use crate::error::AuthError;

#[derive(Debug, Clone)]
struct OtpRecord {
    code: String,
    expires_at: DateTime<Utc>,
}

/// Lock-protected map of pending reset codes keyed by username.
#[derive(Debug, Default)]
pub struct OtpStore {
    records: Mutex<HashMap<String, OtpRecord>>,
}

impl OtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, OtpRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a fresh 6-digit code for `username`, replacing any
    /// pending one.
    pub fn issue_at(&self, username: &str, now: DateTime<Utc>, lifetime: Duration) -> String {
        let code = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        self.lock().insert(
            username.to_string(),
            OtpRecord {
                code: code.clone(),
                expires_at: now + lifetime,
            },
        );
        code
    }

    /// Whether `code` is the live pending code for `username`. A
    /// matching check does not consume the record; an expired one is
    /// removed.
    pub fn verify_at(&self, username: &str, code: &str, now: DateTime<Utc>) -> bool {
        let mut records = self.lock();
        let Some(record) = records.get(username) else {
            return false;
        };
        if now > record.expires_at {
            records.remove(username);
            return false;
        }
        record.code == code
    }

    pub fn evict(&self, username: &str) {
        self.lock().remove(username);
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }
}

/// Result of a successful reset request.
#[derive(Debug, Clone)]
pub struct ResetTicket {
    /// The issued code. Only suitable for returning to the caller in a
    /// demo deployment.
    pub code: String,
    pub masked_email: String,
}

#[derive(Debug)]
pub struct ResetPasswordInput {
    pub username: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Mask an e-mail address for display: `a*****@example.com`,
/// `*@example.com` for local parts of two characters or fewer, `***`
/// when there is no `@`.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return "***".into();
    };
    let mut chars = local.chars();
    match chars.next() {
        Some(first) if local.chars().count() > 2 => format!("{first}*****@{domain}"),
        _ => format!("*@{domain}"),
    }
}

/// Password reset flow over the credential store.
pub struct PasswordResetService<U: UserRepository> {
    user_repo: U,
    otps: Arc<OtpStore>,
    config: AuthConfig,
}

impl<U: UserRepository> PasswordResetService<U> {
    pub fn new(user_repo: U, otps: Arc<OtpStore>, config: AuthConfig) -> Self {
        Self {
            user_repo,
            otps,
            config,
        }
    }

    pub async fn request_reset(&self, username: &str, email: &str) -> LeadflowResult<ResetTicket> {
        self.request_reset_at(username, email, Utc::now()).await
    }

    /// Issue a reset code when `email` matches the stored address,
    /// ignoring case. An unknown user and a mismatched address fail
    /// identically.
    pub async fn request_reset_at(
        &self,
        username: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> LeadflowResult<ResetTicket> {
        let not_found = || LeadflowError::NotFound {
            entity: "user".into(),
            id: username.to_string(),
        };

        let user = match self.user_repo.get_by_username(username).await {
            Ok(u) => u,
            Err(LeadflowError::NotFound { .. }) => return Err(not_found()),
            Err(e) => return Err(e),
        };

        let stored = user.email.as_deref().map(str::trim).unwrap_or_default();
        if stored.is_empty() || !stored.eq_ignore_ascii_case(email.trim()) {
            return Err(not_found());
        }

        let lifetime = Duration::seconds(self.config.otp_lifetime_secs as i64);
        let code = self.otps.issue_at(username, now, lifetime);
        info!(username, "Password reset requested");

        Ok(ResetTicket {
            code,
            masked_email: mask_email(stored),
        })
    }

    pub fn verify_otp(&self, username: &str, code: &str) -> LeadflowResult<()> {
        self.verify_otp_at(username, code, Utc::now())
    }

    pub fn verify_otp_at(&self, username: &str, code: &str, now: DateTime<Utc>) -> LeadflowResult<()> {
        if self.otps.verify_at(username, code, now) {
            Ok(())
        } else {
            Err(AuthError::OtpInvalid.into())
        }
    }

    /// Overwrite the stored password and drop any pending code.
    pub async fn reset_password(&self, input: ResetPasswordInput) -> LeadflowResult<()> {
        if input.new_password != input.confirm_password {
            return Err(LeadflowError::validation("Passwords do not match"));
        }
        let min = self.config.min_password_length;
        if input.new_password.chars().count() < min {
            return Err(LeadflowError::validation(format!(
                "Password must be at least {min} characters"
            )));
        }

        self.user_repo
            .update_password(&input.username, &input.new_password)
            .await?;
        self.otps.evict(&input.username);
        info!(username = %input.username, "Password reset completed");
        Ok(())
    }
}
