//! Lead modification (audit) log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field name written when a lead is created.
pub const FIELD_CREATED: &str = "CREATED";
/// Field name of the terminal entry written before a lead is deleted.
pub const FIELD_DELETED: &str = "DELETED";

/// One immutable change record. `lead_id` is a plain reference, so the
/// row stays queryable after the lead itself is gone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadModification {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub modified_field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub modified_by: String,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateLeadModification {
    pub lead_id: Uuid,
    pub modified_field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub modified_by: String,
}

impl CreateLeadModification {
    pub fn created(lead_id: Uuid, actor: &str) -> Self {
        Self {
            lead_id,
            modified_field: FIELD_CREATED.into(),
            old_value: None,
            new_value: Some("Lead created".into()),
            modified_by: actor.into(),
        }
    }

    pub fn deleted(lead_id: Uuid, actor: &str) -> Self {
        Self {
            lead_id,
            modified_field: FIELD_DELETED.into(),
            old_value: Some("Lead deleted".into()),
            new_value: None,
            modified_by: actor.into(),
        }
    }
}
