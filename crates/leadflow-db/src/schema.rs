//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings. Enums are stored as strings with ASSERT constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE option<string>;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['HeadOffice', 'DealerAgent'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user \
    COLUMNS username UNIQUE;

-- =======================================================================
-- Leads
-- =======================================================================
DEFINE TABLE lead SCHEMAFULL;
DEFINE FIELD contact_number ON TABLE lead TYPE string;
DEFINE FIELD government_id ON TABLE lead TYPE option<string>;
DEFINE FIELD first_name ON TABLE lead TYPE string;
DEFINE FIELD last_name ON TABLE lead TYPE option<string>;
DEFINE FIELD email ON TABLE lead TYPE option<string>;
DEFINE FIELD city ON TABLE lead TYPE option<string>;
DEFINE FIELD address ON TABLE lead TYPE option<string>;
DEFINE FIELD model_name ON TABLE lead TYPE option<string>;
DEFINE FIELD lead_source ON TABLE lead TYPE option<string>;
DEFINE FIELD lead_mode ON TABLE lead TYPE option<string>;
DEFINE FIELD follow_up_date ON TABLE lead TYPE option<string>;
DEFINE FIELD status ON TABLE lead TYPE string \
    ASSERT $value IN ['NEW', 'QUALIFIED', 'UNQUALIFIED', 'LOST'];
DEFINE FIELD created_at ON TABLE lead TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE FIELD updated_at ON TABLE lead TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_lead_contact_number ON TABLE lead \
    COLUMNS contact_number UNIQUE;
DEFINE INDEX idx_lead_government_id ON TABLE lead \
    COLUMNS government_id UNIQUE;
DEFINE INDEX idx_lead_status ON TABLE lead COLUMNS status;
DEFINE INDEX idx_lead_city ON TABLE lead COLUMNS city;
DEFINE INDEX idx_lead_created_at ON TABLE lead COLUMNS created_at;

-- =======================================================================
-- Lead modifications (append-only)
-- =======================================================================
DEFINE TABLE lead_modification SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD lead_id ON TABLE lead_modification TYPE string;
DEFINE FIELD modified_field ON TABLE lead_modification TYPE string;
DEFINE FIELD old_value ON TABLE lead_modification TYPE option<string>;
DEFINE FIELD new_value ON TABLE lead_modification TYPE option<string>;
DEFINE FIELD modified_by ON TABLE lead_modification TYPE string;
DEFINE FIELD modified_at ON TABLE lead_modification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_modification_lead_time ON TABLE lead_modification \
    COLUMNS lead_id, modified_at;

-- =======================================================================
-- Chat messages (append-only)
-- =======================================================================
DEFINE TABLE chat_message SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD lead_id ON TABLE chat_message TYPE string;
DEFINE FIELD sender ON TABLE chat_message TYPE string;
DEFINE FIELD message ON TABLE chat_message TYPE string \
    ASSERT string::len($value) <= 1000;
DEFINE FIELD sent_at ON TABLE chat_message TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_chat_lead_time ON TABLE chat_message \
    COLUMNS lead_id, sent_at;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_every_table() {
        for table in ["user", "lead", "lead_modification", "chat_message"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
