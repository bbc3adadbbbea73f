//! Browser sessions stored in the `session` table, keyed by token hash.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::{SurrealValue, Value};
use todo_core::error::TodoResult;
use todo_core::models::session::{CreateSession, Session};
use todo_core::repository::SessionRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SessionRecord {
    record_id: String,
    user_id: String,
    token_hash: String,
    user_agent: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

fn uuid_field(raw: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("session {field} {raw}: {e}")))
}

impl TryFrom<SessionRecord> for Session {
    type Error = DbError;

    fn try_from(rec: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Session {
            id: uuid_field(&rec.record_id, "id")?,
            user_id: uuid_field(&rec.user_id, "user_id")?,
            token_hash: rec.token_hash,
            user_agent: rec.user_agent,
            expires_at: rec.expires_at,
            created_at: rec.created_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run a `DELETE session ...` statement and count what it removed.
    /// `RETURN BEFORE` yields one row per deleted session.
    async fn remove(
        &self,
        filter: &str,
        binding: Option<(&'static str, String)>,
    ) -> TodoResult<u64> {
        let sql = format!("DELETE session {filter} RETURN BEFORE");
        let mut query = self.db.query(sql);
        if let Some(binding) = binding {
            query = query.bind(binding);
        }
        let mut response = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        let removed: Vec<Value> = response.take(0).map_err(DbError::from)?;
        Ok(removed.len() as u64)
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> TodoResult<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            token_hash: input.token_hash,
            user_agent: input.user_agent,
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };

        self.db
            .query(
                "CREATE type::record('session', $id) SET user_id = $user_id, \
                 token_hash = $token_hash, user_agent = $user_agent, \
                 expires_at = $expires_at, created_at = $created_at",
            )
            .bind(("id", session.id.to_string()))
            .bind(("user_id", session.user_id.to_string()))
            .bind(("token_hash", session.token_hash.clone()))
            .bind(("user_agent", session.user_agent.clone()))
            .bind(("expires_at", session.expires_at))
            .bind(("created_at", session.created_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(session)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> TodoResult<Session> {
        let mut response = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, user_id, token_hash, user_agent, \
                 expires_at, created_at FROM session WHERE token_hash = $token_hash LIMIT 1",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let records: Vec<SessionRecord> = response.take(0).map_err(DbError::from)?;
        let record = records.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            // never echo the hash
            id: "<token>".into(),
        })?;
        Ok(Session::try_from(record)?)
    }

    async fn invalidate(&self, id: Uuid) -> TodoResult<()> {
        self.remove("WHERE id = type::record('session', $id)", Some(("id", id.to_string())))
            .await
            .map(|_| ())
    }

    async fn invalidate_user_sessions(&self, user_id: Uuid) -> TodoResult<()> {
        self.remove("WHERE user_id = $user_id", Some(("user_id", user_id.to_string())))
            .await
            .map(|_| ())
    }

    async fn cleanup_expired(&self) -> TodoResult<u64> {
        self.remove("WHERE expires_at < time::now()", None).await
    }
}
