//! Route authorization rules.
//!
//! The most specific matching prefix decides; paths matching no rule
//! need any authenticated identity.

use leadflow_core::error::{LeadflowError, LeadflowResult};
use leadflow_core::models::user::{Identity, Role};

/// What a route requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

struct AccessRule {
    prefix: &'static str,
    access: Access,
}

const RULES: &[AccessRule] = &[
    AccessRule {
        prefix: "/auth",
        access: Access::Public,
    },
    AccessRule {
        prefix: "/health",
        access: Access::Public,
    },
    AccessRule {
        prefix: "/api/dashboard",
        access: Access::Roles(&[Role::HeadOffice]),
    },
    AccessRule {
        prefix: "/api/leads",
        access: Access::Roles(&[Role::HeadOffice, Role::DealerAgent]),
    },
];

/// Prefix match on whole path segments, so `/authx` does not fall
/// under `/auth`.
fn matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn required_access(path: &str) -> Access {
    RULES
        .iter()
        .filter(|rule| matches(rule.prefix, path))
        .max_by_key(|rule| rule.prefix.len())
        .map(|rule| rule.access)
        .unwrap_or(Access::Authenticated)
}

/// Decide whether `identity` may reach `path`.
pub fn authorize(path: &str, identity: Option<&Identity>) -> LeadflowResult<()> {
    match (required_access(path), identity) {
        (Access::Public, _) => Ok(()),
        (_, None) => Err(LeadflowError::AuthenticationFailed {
            reason: "authentication required".into(),
        }),
        (Access::Authenticated, Some(_)) => Ok(()),
        (Access::Roles(roles), Some(id)) if roles.contains(&id.role) => Ok(()),
        (Access::Roles(_), Some(id)) => Err(LeadflowError::AuthorizationDenied {
            reason: format!("{} may not access {path}", id.role),
        }),
    }
}
