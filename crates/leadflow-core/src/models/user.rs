//! User domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LeadflowError;

/// Authorization role. Immutable after the user is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    /// Head Office: full access, including the dashboard.
    #[serde(rename = "ROLE_HO")]
    HeadOffice,
    /// Dealer Agent: lead management only.
    #[serde(rename = "ROLE_DA")]
    DealerAgent,
}

impl Role {
    /// Name used by the storage layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::HeadOffice => "HeadOffice",
            Role::DealerAgent => "DealerAgent",
        }
    }

    /// Name used on the wire (login responses).
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::HeadOffice => "ROLE_HO",
            Role::DealerAgent => "ROLE_DA",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Role {
    type Err = LeadflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HEADOFFICE" | "HEAD_OFFICE" | "ROLE_HO" | "HO" => Ok(Role::HeadOffice),
            "DEALERAGENT" | "DEALER_AGENT" | "ROLE_DA" | "DA" => Ok(Role::DealerAgent),
            _ => Err(LeadflowError::validation(format!("unknown role: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: Option<String>,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub role: Role,
}

/// The authenticated principal attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
        }
    }
}
