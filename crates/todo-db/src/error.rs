//! Database-specific error types and conversions.

use todo_core::error::TodoError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Duplicate { entity: String },
}

impl From<DbError> for TodoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TodoError::NotFound { entity, id },
            DbError::Duplicate { entity } => TodoError::AlreadyExists { entity },
            DbError::Hash(msg) => TodoError::Crypto(msg),
            other => TodoError::Database(other.to_string()),
        }
    }
}
