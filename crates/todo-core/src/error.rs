//! Error types for the todo service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TodoError {
    /// Text that is safe to show to the person at the keyboard.
    ///
    /// Storage and crypto failures collapse into a generic message so
    /// backend details never reach a rendered page.
    pub fn public_message(&self) -> String {
        match self {
            Self::AuthenticationFailed { reason } => capitalize(reason),
            Self::Validation { message } => message.clone(),
            Self::AlreadyExists { entity } if entity == "user" => {
                "User already registered".into()
            }
            Self::AlreadyExists { entity } => format!("{} already exists", capitalize(entity)),
            Self::NotFound { entity, .. } => format!("{} not found", capitalize(entity)),
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_) => {
                "Something went wrong, please try again".into()
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type TodoResult<T> = Result<T, TodoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_reason_is_capitalized() {
        let err = TodoError::AuthenticationFailed {
            reason: "invalid login credentials".into(),
        };
        assert_eq!(err.public_message(), "Invalid login credentials");
    }

    #[test]
    fn duplicate_user_has_friendly_message() {
        let err = TodoError::AlreadyExists {
            entity: "user".into(),
        };
        assert_eq!(err.public_message(), "User already registered");
    }

    #[test]
    fn backend_details_are_hidden() {
        let err = TodoError::Database("connection reset by peer".into());
        assert!(!err.public_message().contains("peer"));
    }
}
