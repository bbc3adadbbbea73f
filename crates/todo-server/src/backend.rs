//! The hosted side of the application: accounts, sessions and task
//! storage behind one handle.

use surrealdb::{Connection, Surreal};
use todo_auth::{AuthConfig, AuthService};
use todo_db::repository::{SurrealSessionRepository, SurrealTaskRepository, SurrealUserRepository};

pub type SurrealAuth<C> = AuthService<SurrealUserRepository<C>, SurrealSessionRepository<C>>;

/// Auth plus owner-scoped data access over a single SurrealDB client.
pub struct Backend<C: Connection> {
    pub auth: SurrealAuth<C>,
    pub tasks: SurrealTaskRepository<C>,
}

impl<C: Connection> Backend<C> {
    pub fn new(db: Surreal<C>, config: AuthConfig) -> Self {
        let users = match config.pepper.clone() {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper),
            None => SurrealUserRepository::new(db.clone()),
        };
        let sessions = SurrealSessionRepository::new(db.clone());

        Self {
            auth: AuthService::new(users, sessions, config),
            tasks: SurrealTaskRepository::new(db),
        }
    }
}
