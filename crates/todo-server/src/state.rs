//! Shared application state handed to every handler.

use surrealdb::engine::any::Any;
use todo_db::{DbError, DbManager, run_migrations};
use tracing::info;

use crate::backend::Backend;
use crate::config::TodoConfig;

pub struct AppState {
    pub backend: Backend<Any>,
    pub secure_cookies: bool,
}

impl AppState {
    /// Connect to the configured database, apply pending migrations and
    /// wire up the backend.
    pub async fn build(config: &TodoConfig) -> Result<Self, DbError> {
        let manager = DbManager::connect(&config.database).await?;
        let db = manager.client().clone();
        run_migrations(&db).await?;
        info!(url = %config.database.url, "Database ready");

        Ok(Self {
            backend: Backend::new(db, config.auth.clone()),
            secure_cookies: config.server.secure_cookies,
        })
    }
}
