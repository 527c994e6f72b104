//! Lead store operations.
//!
//! Creation and deletion each leave one sentinel entry in the
//! modification log; updates leave one entry per changed field.

use chrono::{DateTime, Utc};
use leadflow_core::error::{LeadflowError, LeadflowResult};
use leadflow_core::models::lead::{CreateLead, Lead, LeadStatus, NewLead, UpdateLead};
use leadflow_core::models::modification::{CreateLeadModification, LeadModification};
use leadflow_core::repository::{LeadModificationRepository, LeadRepository};
use tracing::info;
use uuid::Uuid;

use crate::audit;

pub struct LeadService<L: LeadRepository, M: LeadModificationRepository> {
    leads: L,
    history: M,
}

impl<L: LeadRepository, M: LeadModificationRepository> LeadService<L, M> {
    pub fn new(leads: L, history: M) -> Self {
        Self { leads, history }
    }

    /// Validate and store a new lead together with its `CREATED`
    /// entry. A contact number or government id already in use fails
    /// with `AlreadyExists`.
    pub async fn create(&self, input: CreateLead, actor: &str) -> LeadflowResult<Lead> {
        let new = NewLead::from_input(input, Utc::now())?;
        let lead = self.leads.create_with_audit(new, actor).await?;
        info!(lead_id = %lead.id, actor, "Lead created");
        Ok(lead)
    }

    pub async fn get(&self, id: Uuid) -> LeadflowResult<Lead> {
        self.leads.get_by_id(id).await
    }

    pub async fn list(&self) -> LeadflowResult<Vec<Lead>> {
        self.leads.list().await
    }

    /// Replace the mutable fields of a lead and record every field
    /// whose value changed. The new values and their entries are
    /// committed together or not at all.
    pub async fn update(&self, id: Uuid, input: UpdateLead, actor: &str) -> LeadflowResult<Lead> {
        let current = self.leads.get_by_id(id).await?;
        let next = current.apply_update(input, Utc::now())?;
        let changes = audit::diff_leads(&current, &next, actor);
        let changed = changes.len();

        let updated = self.leads.update_with_audit(&next, changes).await?;
        info!(lead_id = %id, actor, changed, "Lead updated");
        Ok(updated)
    }

    /// Remove a lead. The terminal `DELETED` entry and the removal are
    /// written in one transaction.
    pub async fn delete(&self, id: Uuid, actor: &str) -> LeadflowResult<()> {
        self.leads
            .delete_with_audit(id, CreateLeadModification::deleted(id, actor))
            .await?;
        info!(lead_id = %id, actor, "Lead deleted");
        Ok(())
    }

    pub async fn by_status(&self, status: &str) -> LeadflowResult<Vec<Lead>> {
        let status: LeadStatus = status.parse()?;
        self.leads.list_by_status(status).await
    }

    pub async fn by_city(&self, city: &str) -> LeadflowResult<Vec<Lead>> {
        let city = city.trim();
        if city.is_empty() {
            return Err(LeadflowError::validation("city is required"));
        }
        self.leads.list_by_city(city).await
    }

    /// Leads created within `[from, to]`, both ends inclusive.
    pub async fn by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LeadflowResult<Vec<Lead>> {
        if from > to {
            return Err(LeadflowError::validation(
                "fromDate must not be after toDate",
            ));
        }
        self.leads.list_created_between(from, to).await
    }

    /// Change history of a lead, newest first.
    ///
    /// History outlives the lead; only an id with neither a lead nor
    /// any history is `NotFound`.
    pub async fn modification_history(&self, id: Uuid) -> LeadflowResult<Vec<LeadModification>> {
        let entries = self.history.list_for_lead(id).await?;
        if entries.is_empty() {
            self.leads.get_by_id(id).await?;
        }
        Ok(entries)
    }
}
