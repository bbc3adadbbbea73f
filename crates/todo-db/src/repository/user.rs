//! Accounts stored in the `user` table.
//!
//! Passwords are hashed with Argon2id (19 MiB, 2 passes, 1 lane) and a
//! fresh random salt. A configured pepper is prefixed to the password.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use todo_core::error::TodoResult;
use todo_core::models::user::{CreateUser, User};
use todo_core::repository::UserRepository;
use uuid::Uuid;

use crate::error::DbError;

const SELECT_USER: &str = "SELECT meta::id(id) AS record_id, email, password_hash, \
     created_at, updated_at FROM user";

#[derive(Debug, SurrealValue)]
struct UserRecord {
    record_id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = DbError;

    fn try_from(rec: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: Uuid::parse_str(&rec.record_id)
                .map_err(|e| DbError::Decode(format!("user id {}: {e}", rec.record_id)))?,
            email: rec.email,
            password_hash: rec.password_hash,
            created_at: rec.created_at,
            updated_at: rec.updated_at,
        })
    }
}

/// Produce a PHC-format Argon2id hash of `password`.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    let params = Params::new(19 * 1024, 2, 1, None)
        .map_err(|e| DbError::Hash(format!("argon2 parameters: {e}")))?;
    let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let material = match pepper {
        Some(pepper) => format!("{pepper}{password}"),
        None => password.to_owned(),
    };
    let salt = SaltString::generate(&mut OsRng);

    hasher
        .hash_password(material.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Hash(e.to_string()))
}

#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    /// Same as [`Self::new`], hashing with a server-side pepper.
    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    async fn find_one(
        &self,
        filter: &str,
        key: (&'static str, String),
    ) -> TodoResult<Option<User>> {
        let mut response = self
            .db
            .query(format!("{SELECT_USER} WHERE {filter} LIMIT 1"))
            .bind(key)
            .await
            .map_err(DbError::from)?;
        let records: Vec<UserRecord> = response.take(0).map_err(DbError::from)?;
        match records.into_iter().next() {
            Some(rec) => Ok(Some(User::try_from(rec)?)),
            None => Ok(None),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> TodoResult<User> {
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let user = User {
            id: Uuid::new_v4(),
            email: input.email,
            password_hash,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.db
            .query(
                "CREATE type::record('user', $id) SET email = $email, \
                 password_hash = $password_hash, created_at = $now, updated_at = $now",
            )
            .bind(("id", user.id.to_string()))
            .bind(("email", user.email.clone()))
            .bind(("password_hash", user.password_hash.clone()))
            .bind(("now", user.created_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("idx_user_email") {
                    DbError::Duplicate {
                        entity: "user".into(),
                    }
                } else {
                    DbError::Query(msg)
                }
            })?;

        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> TodoResult<User> {
        self.find_one("id = type::record('user', $id)", ("id", id.to_string()))
            .await?
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "user".into(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn get_by_email(&self, email: &str) -> TodoResult<User> {
        self.find_one("email = $email", ("email", email.to_string()))
            .await?
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "user".into(),
                    id: format!("email={email}"),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_argon2id_with_fresh_salt() {
        let first = hash_password("hunter22", None).unwrap();
        let second = hash_password("hunter22", None).unwrap();
        assert!(first.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert_ne!(first, second);
    }
}
