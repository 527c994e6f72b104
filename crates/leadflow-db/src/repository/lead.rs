//! SurrealDB implementation of [`LeadRepository`].
//!
//! Uniqueness of `contact_number` and `government_id` is enforced by
//! UNIQUE indexes, never by a read-before-write in this module. Every
//! write that carries log entries commits them in the same
//! transaction as the lead itself.

use chrono::{DateTime, NaiveDate, Utc};
use leadflow_core::error::LeadflowResult;
use leadflow_core::models::lead::{Lead, LeadMode, LeadStatus, NewLead};
use leadflow_core::models::modification::CreateLeadModification;
use leadflow_core::repository::{LeadRepository, SourceCount};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

const CREATE_LEAD: &str = "CREATE type::record('lead', $id) SET \
contact_number = $contact_number, government_id = $government_id, \
first_name = $first_name, last_name = $last_name, email = $email, \
city = $city, address = $address, model_name = $model_name, \
lead_source = $lead_source, lead_mode = $lead_mode, \
follow_up_date = $follow_up_date, status = $status, \
updated_at = $updated_at, created_at = $created_at";

const UPDATE_LEAD: &str = "\
IF array::len((SELECT id FROM type::record('lead', $id))) = 0 \
{ THROW 'lead vanished before update' }; \
UPDATE type::record('lead', $id) SET \
contact_number = $contact_number, government_id = $government_id, \
first_name = $first_name, last_name = $last_name, email = $email, \
city = $city, address = $address, model_name = $model_name, \
lead_source = $lead_source, lead_mode = $lead_mode, \
follow_up_date = $follow_up_date, status = $status, \
updated_at = $updated_at";

/// Appends every entry of `$changes` to the modification log.
const AUDIT_INSERT: &str = "\
FOR $change IN $changes { \
CREATE type::record('lead_modification', $change.id) SET \
lead_id = $change.lead_id, modified_field = $change.modified_field, \
old_value = $change.old_value, new_value = $change.new_value, \
modified_by = $change.modified_by, modified_at = time::now(); \
};";

/// One `$changes` entry.
#[derive(Debug, SurrealValue)]
struct AuditBinding {
    id: String,
    lead_id: String,
    modified_field: String,
    old_value: Option<String>,
    new_value: Option<String>,
    modified_by: String,
}

impl From<CreateLeadModification> for AuditBinding {
    fn from(entry: CreateLeadModification) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            lead_id: entry.lead_id.to_string(),
            modified_field: entry.modified_field,
            old_value: entry.old_value,
            new_value: entry.new_value,
            modified_by: entry.modified_by,
        }
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct LeadRow {
    contact_number: String,
    government_id: Option<String>,
    first_name: String,
    last_name: Option<String>,
    email: Option<String>,
    city: Option<String>,
    address: Option<String>,
    model_name: Option<String>,
    lead_source: Option<String>,
    lead_mode: Option<String>,
    follow_up_date: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct LeadRowWithId {
    record_id: String,
    contact_number: String,
    government_id: Option<String>,
    first_name: String,
    last_name: Option<String>,
    email: Option<String>,
    city: Option<String>,
    address: Option<String>,
    model_name: Option<String>,
    lead_source: Option<String>,
    lead_mode: Option<String>,
    follow_up_date: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SourceRow {
    lead_source: Option<String>,
    total: u64,
}

fn parse_status(s: &str) -> Result<LeadStatus, DbError> {
    s.parse()
        .map_err(|_| DbError::Decode(format!("unknown lead status: {s}")))
}

fn parse_mode(s: Option<String>) -> Result<Option<LeadMode>, DbError> {
    s.map(|m| {
        m.parse()
            .map_err(|_| DbError::Decode(format!("unknown lead mode: {m}")))
    })
    .transpose()
}

fn parse_date(s: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    s.map(|d| {
        NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .map_err(|e| DbError::Decode(format!("invalid follow-up date {d}: {e}")))
    })
    .transpose()
}

impl LeadRow {
    fn into_lead(self, id: Uuid) -> Result<Lead, DbError> {
        Ok(Lead {
            id,
            contact_number: self.contact_number,
            government_id: self.government_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            city: self.city,
            address: self.address,
            model_name: self.model_name,
            lead_source: self.lead_source,
            lead_mode: parse_mode(self.lead_mode)?,
            follow_up_date: parse_date(self.follow_up_date)?,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl LeadRowWithId {
    fn try_into_lead(self) -> Result<Lead, DbError> {
        let id = parse_uuid(&self.record_id, "lead")?;
        LeadRow {
            contact_number: self.contact_number,
            government_id: self.government_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            city: self.city,
            address: self.address,
            model_name: self.model_name,
            lead_source: self.lead_source,
            lead_mode: self.lead_mode,
            follow_up_date: self.follow_up_date,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_lead(id)
    }
}

fn rows_into_leads(rows: Vec<LeadRowWithId>) -> Result<Vec<Lead>, DbError> {
    rows.into_iter()
        .map(LeadRowWithId::try_into_lead)
        .collect()
}

/// Column values shared by create and update statements.
struct LeadBindings {
    contact_number: String,
    government_id: Option<String>,
    first_name: String,
    last_name: Option<String>,
    email: Option<String>,
    city: Option<String>,
    address: Option<String>,
    model_name: Option<String>,
    lead_source: Option<String>,
    lead_mode: Option<String>,
    follow_up_date: Option<String>,
    status: String,
    updated_at: DateTime<Utc>,
}

impl From<&NewLead> for LeadBindings {
    fn from(lead: &NewLead) -> Self {
        Self {
            contact_number: lead.contact_number.clone(),
            government_id: lead.government_id.clone(),
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            email: lead.email.clone(),
            city: lead.city.clone(),
            address: lead.address.clone(),
            model_name: lead.model_name.clone(),
            lead_source: lead.lead_source.clone(),
            lead_mode: lead.lead_mode.map(|m| m.as_str().to_string()),
            follow_up_date: lead.follow_up_date.map(|d| d.format("%Y-%m-%d").to_string()),
            status: lead.status.as_str().to_string(),
            updated_at: lead.updated_at,
        }
    }
}

impl From<&Lead> for LeadBindings {
    fn from(lead: &Lead) -> Self {
        Self {
            contact_number: lead.contact_number.clone(),
            government_id: lead.government_id.clone(),
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            email: lead.email.clone(),
            city: lead.city.clone(),
            address: lead.address.clone(),
            model_name: lead.model_name.clone(),
            lead_source: lead.lead_source.clone(),
            lead_mode: lead.lead_mode.map(|m| m.as_str().to_string()),
            follow_up_date: lead.follow_up_date.map(|d| d.format("%Y-%m-%d").to_string()),
            status: lead.status.as_str().to_string(),
            updated_at: lead.updated_at,
        }
    }
}

/// SurrealDB implementation of the Lead repository.
#[derive(Clone)]
pub struct SurrealLeadRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLeadRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run `lead_statement` and append `audit` inside one transaction,
    /// then read the lead back.
    async fn write_with_audit(
        &self,
        lead_statement: &str,
        id: Uuid,
        values: LeadBindings,
        created_at: Option<DateTime<Utc>>,
        audit: Vec<CreateLeadModification>,
    ) -> LeadflowResult<Lead> {
        let statement = format!(
            "BEGIN TRANSACTION; {lead_statement}; {AUDIT_INSERT} COMMIT TRANSACTION;"
        );
        let changes: Vec<AuditBinding> = audit.into_iter().map(AuditBinding::from).collect();

        let mut builder = self
            .db
            .query(statement)
            .bind(("id", id.to_string()))
            .bind(("contact_number", values.contact_number))
            .bind(("government_id", values.government_id))
            .bind(("first_name", values.first_name))
            .bind(("last_name", values.last_name))
            .bind(("email", values.email))
            .bind(("city", values.city))
            .bind(("address", values.address))
            .bind(("model_name", values.model_name))
            .bind(("lead_source", values.lead_source))
            .bind(("lead_mode", values.lead_mode))
            .bind(("follow_up_date", values.follow_up_date))
            .bind(("status", values.status))
            .bind(("updated_at", values.updated_at))
            .bind(("changes", changes));
        if let Some(created_at) = created_at {
            builder = builder.bind(("created_at", created_at));
        }

        let mut response = builder.await.map_err(DbError::from)?;
        let errors = response.take_errors();
        if !errors.is_empty() {
            return Err(DbError::from_transaction("lead", errors).into());
        }

        self.get_by_id(id).await
    }
}

impl<C: Connection> LeadRepository for SurrealLeadRepository<C> {
    async fn create(&self, input: NewLead) -> LeadflowResult<Lead> {
        self.write_with_audit(
            CREATE_LEAD,
            Uuid::new_v4(),
            LeadBindings::from(&input),
            Some(input.created_at),
            Vec::new(),
        )
        .await
    }

    async fn create_with_audit(&self, input: NewLead, actor: &str) -> LeadflowResult<Lead> {
        let id = Uuid::new_v4();
        self.write_with_audit(
            CREATE_LEAD,
            id,
            LeadBindings::from(&input),
            Some(input.created_at),
            vec![CreateLeadModification::created(id, actor)],
        )
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Lead> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('lead', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeadRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lead".into(),
            id: id_str,
        })?;

        Ok(row.into_lead(id)?)
    }

    async fn list(&self) -> LeadflowResult<Vec<Lead>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM lead ORDER BY created_at DESC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeadRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_leads(rows)?)
    }

    async fn update_with_audit(
        &self,
        lead: &Lead,
        audit: Vec<CreateLeadModification>,
    ) -> LeadflowResult<Lead> {
        self.write_with_audit(UPDATE_LEAD, lead.id, LeadBindings::from(lead), None, audit)
            .await
    }

    async fn delete_with_audit(
        &self,
        id: Uuid,
        audit: CreateLeadModification,
    ) -> LeadflowResult<()> {
        // Surface a missing lead as NotFound before opening the transaction.
        self.get_by_id(id).await?;

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 LET $existing = (SELECT id FROM type::record('lead', $lead_id)); \
                 IF array::len($existing) = 0 { THROW 'lead vanished before delete' }; \
                 CREATE type::record('lead_modification', $modification_id) SET \
                 lead_id = $lead_id, modified_field = $modified_field, \
                 old_value = $old_value, new_value = $new_value, \
                 modified_by = $modified_by, modified_at = time::now(); \
                 DELETE type::record('lead', $lead_id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("lead_id", id.to_string()))
            .bind(("modification_id", Uuid::new_v4().to_string()))
            .bind(("modified_field", audit.modified_field))
            .bind(("old_value", audit.old_value))
            .bind(("new_value", audit.new_value))
            .bind(("modified_by", audit.modified_by))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(format!("delete lead {id}: {e}")))?;

        Ok(())
    }

    async fn list_by_status(&self, status: LeadStatus) -> LeadflowResult<Vec<Lead>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM lead \
                 WHERE status = $status ORDER BY created_at DESC",
            )
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeadRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_leads(rows)?)
    }

    async fn list_by_city(&self, city: &str) -> LeadflowResult<Vec<Lead>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM lead \
                 WHERE city = $city ORDER BY created_at DESC",
            )
            .bind(("city", city.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeadRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_leads(rows)?)
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LeadflowResult<Vec<Lead>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM lead \
                 WHERE created_at >= $from AND created_at <= $to \
                 ORDER BY created_at DESC",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeadRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_leads(rows)?)
    }

    async fn count_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LeadflowResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM lead \
                 WHERE created_at >= $from AND created_at <= $to GROUP ALL",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_by_status_created_between(
        &self,
        status: LeadStatus,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LeadflowResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM lead \
                 WHERE status = $status \
                 AND created_at >= $from AND created_at <= $to GROUP ALL",
            )
            .bind(("status", status.as_str().to_string()))
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_by_source(&self) -> LeadflowResult<Vec<SourceCount>> {
        let mut result = self
            .db
            .query("SELECT lead_source, count() AS total FROM lead GROUP BY lead_source")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SourceRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|r| SourceCount {
                source: r.lead_source,
                total: r.total,
            })
            .collect())
    }
}
