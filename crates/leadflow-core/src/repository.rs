//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Domain services are generic
//! over these traits so that they carry no dependency on the database
//! crate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::LeadflowResult;
use crate::models::{
    chat::{ChatMessage, CreateChatMessage},
    lead::{Lead, LeadStatus, NewLead},
    modification::{CreateLeadModification, LeadModification},
    user::{CreateUser, User},
};

/// Lead count for one source label. `source` is `None` for leads
/// recorded without a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCount {
    pub source: Option<String>,
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Identity & credentials
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = LeadflowResult<User>> + Send;
    fn get_by_username(&self, username: &str)
    -> impl Future<Output = LeadflowResult<User>> + Send;
    /// Re-hash and overwrite the stored password.
    fn update_password(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = LeadflowResult<()>> + Send;
    fn set_email(
        &self,
        username: &str,
        email: &str,
    ) -> impl Future<Output = LeadflowResult<()>> + Send;
    fn count(&self) -> impl Future<Output = LeadflowResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

pub trait LeadRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the contact number or government
    /// id collides with an existing lead.
    fn create(&self, input: NewLead) -> impl Future<Output = LeadflowResult<Lead>> + Send;
    /// Create a lead and its `CREATED` log entry in one transaction.
    fn create_with_audit(
        &self,
        input: NewLead,
        actor: &str,
    ) -> impl Future<Output = LeadflowResult<Lead>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LeadflowResult<Lead>> + Send;
    fn list(&self) -> impl Future<Output = LeadflowResult<Vec<Lead>>> + Send;
    /// Overwrite every mutable field and `updated_at` of `lead.id` and
    /// append `audit`, all in one transaction.
    fn update_with_audit(
        &self,
        lead: &Lead,
        audit: Vec<CreateLeadModification>,
    ) -> impl Future<Output = LeadflowResult<Lead>> + Send;
    /// Append `audit` and delete the lead in a single transaction.
    fn delete_with_audit(
        &self,
        id: Uuid,
        audit: CreateLeadModification,
    ) -> impl Future<Output = LeadflowResult<()>> + Send;

    fn list_by_status(
        &self,
        status: LeadStatus,
    ) -> impl Future<Output = LeadflowResult<Vec<Lead>>> + Send;
    fn list_by_city(&self, city: &str) -> impl Future<Output = LeadflowResult<Vec<Lead>>> + Send;
    /// Leads whose `created_at` lies in `[from, to]`.
    fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = LeadflowResult<Vec<Lead>>> + Send;

    fn count_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = LeadflowResult<u64>> + Send;
    fn count_by_status_created_between(
        &self,
        status: LeadStatus,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = LeadflowResult<u64>> + Send;
    /// Group-count over all leads by `lead_source`.
    fn count_by_source(&self) -> impl Future<Output = LeadflowResult<Vec<SourceCount>>> + Send;
}

// ---------------------------------------------------------------------------
// Append-only logs
// ---------------------------------------------------------------------------

/// Read side of the modification log. Entries are only ever written
/// by the audited operations of [`LeadRepository`].
pub trait LeadModificationRepository: Send + Sync {
    /// History of one lead, newest first.
    fn list_for_lead(
        &self,
        lead_id: Uuid,
    ) -> impl Future<Output = LeadflowResult<Vec<LeadModification>>> + Send;
}

pub trait ChatMessageRepository: Send + Sync {
    fn append(
        &self,
        input: CreateChatMessage,
    ) -> impl Future<Output = LeadflowResult<ChatMessage>> + Send;
    /// Thread of one lead, oldest first.
    fn list_for_lead(
        &self,
        lead_id: Uuid,
    ) -> impl Future<Output = LeadflowResult<Vec<ChatMessage>>> + Send;
}
