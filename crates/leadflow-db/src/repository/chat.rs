//! SurrealDB implementation of [`ChatMessageRepository`].

use chrono::{DateTime, Utc};
use leadflow_core::error::LeadflowResult;
use leadflow_core::models::chat::{ChatMessage, CreateChatMessage};
use leadflow_core::repository::ChatMessageRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ChatMessageRow {
    lead_id: String,
    sender: String,
    message: String,
    sent_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ChatMessageRowWithId {
    record_id: String,
    lead_id: String,
    sender: String,
    message: String,
    sent_at: DateTime<Utc>,
}

impl ChatMessageRow {
    fn into_message(self, id: Uuid) -> Result<ChatMessage, DbError> {
        Ok(ChatMessage {
            id,
            lead_id: parse_uuid(&self.lead_id, "lead")?,
            sender: self.sender,
            message: self.message,
            timestamp: self.sent_at,
        })
    }
}

impl ChatMessageRowWithId {
    fn try_into_message(self) -> Result<ChatMessage, DbError> {
        let id = parse_uuid(&self.record_id, "chat_message")?;
        ChatMessageRow {
            lead_id: self.lead_id,
            sender: self.sender,
            message: self.message,
            sent_at: self.sent_at,
        }
        .into_message(id)
    }
}

/// SurrealDB implementation of the per-lead chat log.
#[derive(Clone)]
pub struct SurrealChatMessageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealChatMessageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ChatMessageRepository for SurrealChatMessageRepository<C> {
    async fn append(&self, input: CreateChatMessage) -> LeadflowResult<ChatMessage> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('chat_message', $id) SET \
                 lead_id = $lead_id, sender = $sender, message = $message",
            )
            .bind(("id", id_str.clone()))
            .bind(("lead_id", input.lead_id.to_string()))
            .bind(("sender", input.sender))
            .bind(("message", input.message))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ChatMessageRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "chat_message".into(),
            id: id_str,
        })?;

        Ok(row.into_message(id)?)
    }

    async fn list_for_lead(&self, lead_id: Uuid) -> LeadflowResult<Vec<ChatMessage>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM chat_message \
                 WHERE lead_id = $lead_id ORDER BY sent_at ASC",
            )
            .bind(("lead_id", lead_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChatMessageRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_message().map_err(Into::into))
            .collect()
    }
}
