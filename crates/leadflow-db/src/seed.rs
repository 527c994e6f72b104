//! First-run provisioning of the built-in accounts.

use leadflow_core::error::{LeadflowError, LeadflowResult};
use leadflow_core::models::user::{CreateUser, Role};
use leadflow_core::repository::UserRepository;
use serde::Deserialize;
use tracing::info;

pub const HEAD_OFFICE_USERNAME: &str = "ho_admin";
pub const DEALER_AGENT_USERNAME: &str = "da_agent";

/// Settings for the accounts created on an empty user table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub enabled: bool,
    pub default_password: String,
    pub head_office_email: Option<String>,
    pub dealer_agent_email: Option<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_password: "1234".into(),
            head_office_email: None,
            dealer_agent_email: None,
        }
    }
}

impl SeedConfig {
    fn accounts(&self) -> [(&'static str, Role, Option<&str>); 2] {
        [
            (
                HEAD_OFFICE_USERNAME,
                Role::HeadOffice,
                self.head_office_email.as_deref(),
            ),
            (
                DEALER_AGENT_USERNAME,
                Role::DealerAgent,
                self.dealer_agent_email.as_deref(),
            ),
        ]
    }
}

/// Create `ho_admin` and `da_agent` when no users exist yet.
///
/// On later runs, a seed account still lacking an e-mail gets the
/// configured address. Returns the number of accounts created.
pub async fn seed_default_users<U: UserRepository>(
    users: &U,
    config: &SeedConfig,
) -> LeadflowResult<usize> {
    if !config.enabled {
        return Ok(0);
    }

    if users.count().await? == 0 {
        for (username, role, email) in config.accounts() {
            users
                .create(CreateUser {
                    username: username.into(),
                    email: email.map(str::to_string),
                    password: config.default_password.clone(),
                    role,
                })
                .await?;
            info!(username, role = role.as_str(), "Seeded default user");
        }
        return Ok(2);
    }

    for (username, _, email) in config.accounts() {
        let Some(email) = email else { continue };
        match users.get_by_username(username).await {
            Ok(user) if user.email.is_none() => {
                users.set_email(username, email).await?;
                info!(username, "Backfilled seed user e-mail");
            }
            Ok(_) | Err(LeadflowError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(0)
}
