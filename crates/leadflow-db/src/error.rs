//! Database-specific error types and conversions.

use std::collections::HashMap;

use leadflow_core::error::LeadflowError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid stored value: {0}")]
    Decode(String),

    #[error("Unique constraint violated on {entity}")]
    Duplicate { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify a failed statement: unique index violations become
    /// [`DbError::Duplicate`], everything else [`DbError::Query`].
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if is_unique_violation(&message) {
            DbError::Duplicate {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    /// Classify the errors of a failed transaction block. A unique
    /// index violation anywhere in the block wins.
    pub(crate) fn from_transaction(entity: &str, errors: HashMap<usize, surrealdb::Error>) -> Self {
        let mut errors: Vec<(usize, String)> = errors
            .into_iter()
            .map(|(index, err)| (index, err.to_string()))
            .collect();
        errors.sort_by_key(|(index, _)| *index);

        if errors.iter().any(|(_, message)| is_unique_violation(message)) {
            return DbError::Duplicate {
                entity: entity.into(),
            };
        }
        let messages: Vec<String> = errors.into_iter().map(|(_, message)| message).collect();
        DbError::Query(messages.join("; "))
    }
}

fn is_unique_violation(message: &str) -> bool {
    message.contains("already contains")
}

impl From<DbError> for LeadflowError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LeadflowError::NotFound { entity, id },
            DbError::Duplicate { entity } => LeadflowError::AlreadyExists { entity },
            other => LeadflowError::Database(other.to_string()),
        }
    }
}
