//! Authentication error types.

use thiserror::Error;
use todo_core::error::TodoError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("unable to validate email address: invalid format")]
    InvalidEmail,

    #[error("password should be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("user already registered")]
    EmailTaken,

    #[error("session has expired")]
    SessionExpired,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for TodoError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::SessionExpired => {
                TodoError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::InvalidEmail | AuthError::WeakPassword { .. } => TodoError::Validation {
                message: capitalize(&err.to_string()),
            },
            AuthError::EmailTaken => TodoError::AlreadyExists {
                entity: "user".into(),
            },
            AuthError::Crypto(msg) => TodoError::Crypto(msg),
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
