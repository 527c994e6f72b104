//! Lead domain model.
//!
//! Timestamps and the default status are assigned here, by explicit
//! construction-time and update-time functions called from the lead
//! store, never by the persistence layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LeadflowError, LeadflowResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[default]
    New,
    Qualified,
    Unqualified,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Qualified => "QUALIFIED",
            LeadStatus::Unqualified => "UNQUALIFIED",
            LeadStatus::Lost => "LOST",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = LeadflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(LeadStatus::New),
            "QUALIFIED" => Ok(LeadStatus::Qualified),
            "UNQUALIFIED" => Ok(LeadStatus::Unqualified),
            "LOST" => Ok(LeadStatus::Lost),
            _ => Err(LeadflowError::validation(format!(
                "Invalid lead status: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadMode {
    Online,
    Offline,
}

impl LeadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadMode::Online => "ONLINE",
            LeadMode::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for LeadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadMode {
    type Err = LeadflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => Ok(LeadMode::Online),
            "OFFLINE" => Ok(LeadMode::Offline),
            _ => Err(LeadflowError::validation(format!("Invalid lead mode: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub contact_number: String,
    pub government_id: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub model_name: Option<String>,
    pub lead_source: Option<String>,
    pub lead_mode: Option<LeadMode>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new lead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateLead {
    pub contact_number: String,
    pub first_name: String,
    pub government_id: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub model_name: Option<String>,
    pub lead_source: Option<String>,
    pub lead_mode: Option<LeadMode>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: Option<LeadStatus>,
}

/// Full replacement of a lead's mutable fields.
///
/// Optional text fields left out are cleared. `status: None` keeps the
/// current status.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLead {
    pub contact_number: String,
    pub first_name: String,
    pub government_id: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub model_name: Option<String>,
    pub lead_source: Option<String>,
    pub lead_mode: Option<LeadMode>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: Option<LeadStatus>,
}

/// A validated lead ready to be written by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub contact_number: String,
    pub government_id: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub model_name: Option<String>,
    pub lead_source: Option<String>,
    pub lead_mode: Option<LeadMode>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const MAX_CONTACT_NUMBER: usize = 15;
const MAX_NAME: usize = 100;
const MAX_GOVERNMENT_ID: usize = 50;
const MAX_EMAIL: usize = 150;
const MAX_SHORT_TEXT: usize = 100;
const MAX_ADDRESS: usize = 255;

/// Trim and map blank text to `None`.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(field: &str, value: String) -> LeadflowResult<String> {
    normalize_text(Some(value))
        .ok_or_else(|| LeadflowError::validation(format!("{field} is required")))
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> LeadflowResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(LeadflowError::validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

struct LeadFields {
    contact_number: String,
    government_id: Option<String>,
    first_name: String,
    last_name: Option<String>,
    email: Option<String>,
    city: Option<String>,
    address: Option<String>,
    model_name: Option<String>,
    lead_source: Option<String>,
}

impl LeadFields {
    #[allow(clippy::too_many_arguments)]
    fn normalize(
        contact_number: String,
        first_name: String,
        government_id: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
        city: Option<String>,
        address: Option<String>,
        model_name: Option<String>,
        lead_source: Option<String>,
    ) -> LeadflowResult<Self> {
        let fields = Self {
            contact_number: required("contactNumber", contact_number)?,
            first_name: required("firstName", first_name)?,
            government_id: normalize_text(government_id),
            last_name: normalize_text(last_name),
            email: normalize_text(email),
            city: normalize_text(city),
            address: normalize_text(address),
            model_name: normalize_text(model_name),
            lead_source: normalize_text(lead_source),
        };

        check_len(
            "contactNumber",
            Some(&fields.contact_number),
            MAX_CONTACT_NUMBER,
        )?;
        check_len("firstName", Some(&fields.first_name), MAX_NAME)?;
        check_len("lastName", fields.last_name.as_deref(), MAX_NAME)?;
        check_len(
            "governmentId",
            fields.government_id.as_deref(),
            MAX_GOVERNMENT_ID,
        )?;
        check_len("email", fields.email.as_deref(), MAX_EMAIL)?;
        check_len("city", fields.city.as_deref(), MAX_SHORT_TEXT)?;
        check_len("address", fields.address.as_deref(), MAX_ADDRESS)?;
        check_len("modelName", fields.model_name.as_deref(), MAX_SHORT_TEXT)?;
        check_len("leadSource", fields.lead_source.as_deref(), MAX_SHORT_TEXT)?;
        Ok(fields)
    }
}

impl NewLead {
    /// Validate caller input and stamp creation-time defaults.
    pub fn from_input(input: CreateLead, now: DateTime<Utc>) -> LeadflowResult<Self> {
        let fields = LeadFields::normalize(
            input.contact_number,
            input.first_name,
            input.government_id,
            input.last_name,
            input.email,
            input.city,
            input.address,
            input.model_name,
            input.lead_source,
        )?;

        Ok(Self {
            contact_number: fields.contact_number,
            government_id: fields.government_id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            city: fields.city,
            address: fields.address,
            model_name: fields.model_name,
            lead_source: fields.lead_source,
            lead_mode: input.lead_mode,
            follow_up_date: input.follow_up_date,
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Lead {
    /// Produce the updated lead. `id` and `created_at` are carried over;
    /// `updated_at` is refreshed, never moving before `created_at`.
    pub fn apply_update(&self, input: UpdateLead, now: DateTime<Utc>) -> LeadflowResult<Lead> {
        let fields = LeadFields::normalize(
            input.contact_number,
            input.first_name,
            input.government_id,
            input.last_name,
            input.email,
            input.city,
            input.address,
            input.model_name,
            input.lead_source,
        )?;

        Ok(Lead {
            id: self.id,
            contact_number: fields.contact_number,
            government_id: fields.government_id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            city: fields.city,
            address: fields.address,
            model_name: fields.model_name,
            lead_source: fields.lead_source,
            lead_mode: input.lead_mode,
            follow_up_date: input.follow_up_date,
            status: input.status.unwrap_or(self.status),
            created_at: self.created_at,
            updated_at: now.max(self.created_at),
        })
    }

    /// String renderings of every mutable field, keyed by the field name
    /// written to the modification log.
    pub fn audit_fields(&self) -> [(&'static str, Option<String>); 12] {
        [
            ("contactNumber", Some(self.contact_number.clone())),
            ("governmentId", self.government_id.clone()),
            ("firstName", Some(self.first_name.clone())),
            ("lastName", self.last_name.clone()),
            ("email", self.email.clone()),
            ("city", self.city.clone()),
            ("address", self.address.clone()),
            ("modelName", self.model_name.clone()),
            ("leadSource", self.lead_source.clone()),
            ("leadMode", self.lead_mode.map(|m| m.as_str().to_string())),
            ("followUpDate", self.follow_up_date.map(|d| d.to_string())),
            ("status", Some(self.status.as_str().to_string())),
        ]
    }
}
