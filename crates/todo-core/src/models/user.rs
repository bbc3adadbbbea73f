//! Account holder. Owns tasks through `Task::owner_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Lowercased, trimmed login email.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-up payload. The password is plaintext here and hashed by the
/// user store.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
}
