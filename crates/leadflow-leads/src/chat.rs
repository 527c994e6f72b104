//! Per-lead chat log.

use leadflow_core::error::{LeadflowError, LeadflowResult};
use leadflow_core::models::chat::{ChatMessage, CreateChatMessage, MAX_MESSAGE_LEN};
use leadflow_core::repository::{ChatMessageRepository, LeadRepository};
use uuid::Uuid;

pub struct ChatService<L: LeadRepository, C: ChatMessageRepository> {
    leads: L,
    messages: C,
}

impl<L: LeadRepository, C: ChatMessageRepository> ChatService<L, C> {
    pub fn new(leads: L, messages: C) -> Self {
        Self { leads, messages }
    }

    /// Append a message to the thread of an existing lead.
    pub async fn send(&self, lead_id: Uuid, sender: &str, message: &str) -> LeadflowResult<ChatMessage> {
        let message = message.trim();
        if message.is_empty() {
            return Err(LeadflowError::validation("message must not be blank"));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(LeadflowError::validation(format!(
                "message must be at most {MAX_MESSAGE_LEN} characters"
            )));
        }

        self.leads.get_by_id(lead_id).await?;

        self.messages
            .append(CreateChatMessage {
                lead_id,
                sender: sender.to_string(),
                message: message.to_string(),
            })
            .await
    }

    /// The thread of a lead, oldest first. Like the modification log,
    /// a thread stays readable after its lead is deleted.
    pub async fn history(&self, lead_id: Uuid) -> LeadflowResult<Vec<ChatMessage>> {
        let thread = self.messages.list_for_lead(lead_id).await?;
        if thread.is_empty() {
            self.leads.get_by_id(lead_id).await?;
        }
        Ok(thread)
    }
}
