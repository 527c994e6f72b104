//! Authentication service: login and bearer-token resolution.

use leadflow_core::error::{LeadflowError, LeadflowResult};
use leadflow_core::models::user::{Identity, Role};
use leadflow_core::repository::UserRepository;
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub token: String,
    pub username: String,
    pub role: Role,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    /// Check a username and password and issue an access token.
    ///
    /// An unknown username and a wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> LeadflowResult<LoginOutput> {
        let user = match self.user_repo.get_by_username(&input.username).await {
            Ok(u) => u,
            Err(LeadflowError::NotFound { .. }) => {
                warn!(username = %input.username, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;

        if !valid {
            warn!(username = %input.username, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = token::issue_access_token(&user.username, &self.config)?;

        Ok(LoginOutput {
            token,
            username: user.username,
            role: user.role,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Resolve a bearer token into the identity it was issued for.
    ///
    /// The subject must still exist in the credential store; a token
    /// whose user has since been removed is rejected.
    pub async fn authenticate(&self, bearer: &str) -> LeadflowResult<Identity> {
        let username = token::verify_access_token(bearer, &self.config)?;

        match self.user_repo.get_by_username(&username).await {
            Ok(user) => Ok(Identity::from(&user)),
            Err(LeadflowError::NotFound { .. }) => Err(LeadflowError::AuthenticationFailed {
                reason: "unknown token subject".into(),
            }),
            Err(e) => Err(e),
        }
    }
}
