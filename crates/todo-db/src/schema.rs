//! Versioned schema for the todo store.
//!
//! Tables are SCHEMAFULL; ids of related records are kept as UUID
//! strings and the task priority as a lowercase string.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

const VERSION_TABLE_DDL: &str = "
DEFINE TABLE IF NOT EXISTS schema_version SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON schema_version TYPE int;
DEFINE FIELD IF NOT EXISTS label ON schema_version TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON schema_version TYPE datetime DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS uniq_schema_version ON schema_version FIELDS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct AppliedVersion {
    version: u32,
}

struct Migration {
    version: u32,
    label: &'static str,
    ddl: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    label: "accounts_sessions_tasks",
    ddl: SCHEMA_V1,
}];

const SCHEMA_V1: &str = "
-- accounts
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON user TYPE string;
DEFINE FIELD password_hash ON user TYPE string;
DEFINE FIELD created_at ON user TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON user TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_user_email ON user FIELDS email UNIQUE;

-- browser sessions, looked up by the SHA-256 of the cookie value
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON session TYPE string;
DEFINE FIELD token_hash ON session TYPE string;
DEFINE FIELD user_agent ON session TYPE option<string>;
DEFINE FIELD expires_at ON session TYPE datetime;
DEFINE FIELD created_at ON session TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_session_token ON session FIELDS token_hash UNIQUE;
DEFINE INDEX idx_session_user ON session FIELDS user_id;

-- tasks, always filtered by owner_id
DEFINE TABLE task SCHEMAFULL;
DEFINE FIELD owner_id ON task TYPE string;
DEFINE FIELD title ON task TYPE string ASSERT string::len(string::trim($value)) > 0;
DEFINE FIELD description ON task TYPE option<string>;
DEFINE FIELD due_date ON task TYPE option<datetime>;
DEFINE FIELD priority ON task TYPE option<string> ASSERT $value = NONE OR $value IN ['low', 'medium', 'high'];
DEFINE FIELD is_completed ON task TYPE bool DEFAULT false;
DEFINE FIELD created_at ON task TYPE datetime DEFAULT time::now() READONLY;
DEFINE FIELD updated_at ON task TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_task_owner_created ON task FIELDS owner_id, created_at;
";

async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut response = db
        .query("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
        .await?;
    let applied: Vec<AppliedVersion> = response.take(0)?;
    Ok(applied.first().map_or(0, |a| a.version))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(
        version = migration.version,
        label = migration.label,
        "Applying schema migration"
    );

    db.query(migration.ddl)
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!("v{} {}: {e}", migration.version, migration.label))
        })?;

    db.query("CREATE schema_version SET version = $version, label = $label")
        .bind(("version", migration.version))
        .bind(("label", migration.label))
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("recording v{}: {e}", migration.version)))?;

    Ok(())
}

/// Bring the database up to the latest schema version. Safe to call on
/// every start; already applied versions are skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(VERSION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current = current_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        debug!(version = current, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        apply(db, migration).await?;
    }
    Ok(())
}

pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
