//! Sign-in / sign-up form.

use serde::Deserialize;
use surrealdb::Connection;
use todo_auth::{SignInInput, SignUpInput, SignedIn};
use todo_core::error::TodoError;
use tracing::debug;

use crate::backend::SurrealAuth;

/// Which provider operation the form submits to. A UI flag only; both
/// modes post to the same route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "signin",
            Self::SignUp => "signup",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Login",
            Self::SignUp => "Sign Up",
        }
    }

    /// Text of the link that switches to the other mode.
    pub fn toggle_prompt(self) -> &'static str {
        match self {
            Self::SignIn => "No account? Sign up",
            Self::SignUp => "Have an account? Log in",
        }
    }
}

/// Fields posted by the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSubmission {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub mode: AuthMode,
}

/// Why the provider turned a submission down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Malformed email or a password below the policy minimum.
    Invalid,
    /// Wrong credentials, a taken email, or a backend fault.
    Rejected,
}

impl From<&TodoError> for AuthFailure {
    fn from(err: &TodoError) -> Self {
        match err {
            TodoError::Validation { .. } => Self::Invalid,
            _ => Self::Rejected,
        }
    }
}

/// What the form shows: current mode, the email to prefill, and the
/// last error from the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub error: Option<String>,
    pub failure: Option<AuthFailure>,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Run the submission against the provider. On failure the returned
    /// form carries the provider's message inline.
    pub async fn submit<C: Connection>(
        auth: &SurrealAuth<C>,
        submission: AuthSubmission,
        user_agent: Option<String>,
    ) -> Result<SignedIn, AuthForm> {
        let AuthSubmission {
            email,
            password,
            mode,
        } = submission;

        let result = match mode {
            AuthMode::SignIn => {
                auth.sign_in(SignInInput {
                    email: email.clone(),
                    password,
                    user_agent,
                })
                .await
            }
            AuthMode::SignUp => {
                auth.sign_up(SignUpInput {
                    email: email.clone(),
                    password,
                    user_agent,
                })
                .await
            }
        };

        result.map_err(|e| {
            debug!(mode = mode.as_str(), error = %e, "Authentication rejected");
            AuthForm {
                mode,
                email,
                error: Some(e.public_message()),
                failure: Some(AuthFailure::from(&e)),
            }
        })
    }
}
