//! SurrealDB implementation of [`LeadModificationRepository`].

use chrono::{DateTime, Utc};
use leadflow_core::error::LeadflowResult;
use leadflow_core::models::modification::LeadModification;
use leadflow_core::repository::LeadModificationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ModificationRowWithId {
    record_id: String,
    lead_id: String,
    modified_field: String,
    old_value: Option<String>,
    new_value: Option<String>,
    modified_by: String,
    modified_at: DateTime<Utc>,
}

impl ModificationRowWithId {
    fn try_into_modification(self) -> Result<LeadModification, DbError> {
        Ok(LeadModification {
            id: parse_uuid(&self.record_id, "lead_modification")?,
            lead_id: parse_uuid(&self.lead_id, "lead")?,
            modified_field: self.modified_field,
            old_value: self.old_value,
            new_value: self.new_value,
            modified_by: self.modified_by,
            modified_at: self.modified_at,
        })
    }
}

/// Reader over the append-only lead modification log.
#[derive(Clone)]
pub struct SurrealLeadModificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLeadModificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LeadModificationRepository for SurrealLeadModificationRepository<C> {
    async fn list_for_lead(&self, lead_id: Uuid) -> LeadflowResult<Vec<LeadModification>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM lead_modification \
                 WHERE lead_id = $lead_id ORDER BY modified_at DESC",
            )
            .bind(("lead_id", lead_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ModificationRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_modification().map_err(Into::into))
            .collect()
    }
}
