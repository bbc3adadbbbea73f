//! Sign-up, sign-in, sign-out and session
//! lookup.

use chrono::{DateTime, Utc};
use todo_core::error::{TodoError, TodoResult};
use todo_core::models::session::CreateSession;
use todo_core::models::user::{CreateUser, User};
use todo_core::repository::{SessionRepository, UserRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the sign-in flow.
#[derive(Debug)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
    pub user_agent: Option<String>,
}

/// Input for the sign-up flow.
#[derive(Debug)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub user_agent: Option<String>,
}

/// Result of a successful sign-in or sign-up.
#[derive(Debug)]
pub struct SignedIn {
    /// Raw opaque session token (return to client, not stored).
    pub token: String,
    pub session_id: Uuid,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register a new account and open a session for it.
    pub async fn sign_up(&self, input: SignUpInput) -> TodoResult<SignedIn> {
        let email = normalize_email(&input.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidEmail.into());
        }
        if input.password.chars().count() < self.config.min_password_length {
            return Err(AuthError::WeakPassword {
                min: self.config.min_password_length,
            }
            .into());
        }

        match self.user_repo.get_by_email(&email).await {
            Ok(_) => return Err(AuthError::EmailTaken.into()),
            Err(TodoError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let user = self
            .user_repo
            .create(CreateUser {
                email,
                password: input.password,
            })
            .await?;

        info!(user_id = %user.id, "User signed up");

        self.open_session(user, input.user_agent).await
    }

    /// Authenticate with email + password and open a session.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn sign_in(&self, input: SignInInput) -> TodoResult<SignedIn> {
        let email = normalize_email(&input.email);

        let user = match self.user_repo.get_by_email(&email).await {
            Ok(u) => u,
            Err(TodoError::NotFound { .. }) => {
                debug!("Sign-in for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;

        if !valid {
            debug!(user_id = %user.id, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "User signed in");

        self.open_session(user, input.user_agent).await
    }

    /// End the session identified by `raw_token`. Unknown tokens are
    /// treated as already signed out.
    pub async fn sign_out(&self, raw_token: &str) -> TodoResult<()> {
        let token_hash = token::hash_session_token(raw_token);
        match self.session_repo.get_by_token_hash(&token_hash).await {
            Ok(session) => {
                self.session_repo.invalidate(session.id).await?;
                info!(user_id = %session.user_id, "User signed out");
                Ok(())
            }
            Err(TodoError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Resolve the user behind a session token.
    ///
    /// Returns `Ok(None)` for unknown or expired tokens; expired
    /// sessions are removed on the way.
    pub async fn current_user(&self, raw_token: &str) -> TodoResult<Option<User>> {
        let token_hash = token::hash_session_token(raw_token);
        let session = match self.session_repo.get_by_token_hash(&token_hash).await {
            Ok(session) => session,
            Err(TodoError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if session.is_expired(Utc::now()) {
            debug!(session_id = %session.id, "Session expired");
            if let Err(e) = self.session_repo.invalidate(session.id).await {
                warn!(session_id = %session.id, error = %e, "Failed to drop expired session");
            }
            return Ok(None);
        }

        match self.user_repo.get_by_id(session.user_id).await {
            Ok(user) => Ok(Some(user)),
            Err(TodoError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Revoke all sessions for a user.
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> TodoResult<()> {
        self.session_repo.invalidate_user_sessions(user_id).await
    }

    /// Remove expired sessions from the store.
    pub async fn cleanup_expired_sessions(&self) -> TodoResult<u64> {
        let removed = self.session_repo.cleanup_expired().await?;
        if removed > 0 {
            info!(removed, "Expired sessions removed");
        }
        Ok(removed)
    }

    async fn open_session(&self, user: User, user_agent: Option<String>) -> TodoResult<SignedIn> {
        let raw = token::generate_session_token();
        let token_hash = token::hash_session_token(&raw);
        let expires_at = self
            .config
            .session_lifetime()
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                TodoError::Internal(format!(
                    "session lifetime of {}s is out of range",
                    self.config.session_lifetime_secs
                ))
            })?;

        let session = self
            .session_repo
            .create(CreateSession {
                user_id: user.id,
                token_hash,
                user_agent,
                expires_at,
            })
            .await?;

        Ok(SignedIn {
            token: raw,
            session_id: session.id,
            user,
            expires_at: session.expires_at,
        })
    }
}
