//! SurrealDB repository implementations.

mod chat;
mod lead;
mod modification;
mod user;

pub use chat::SurrealChatMessageRepository;
pub use lead::SurrealLeadRepository;
pub use modification::SurrealLeadModificationRepository;
pub use user::{SurrealUserRepository, verify_password};

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}
