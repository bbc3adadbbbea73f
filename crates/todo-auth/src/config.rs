//! Account and session policy.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Longest session lifetime accepted from configuration: ten years.
pub const MAX_SESSION_LIFETIME_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// How long a sign-in stays valid. Also the cookie max-age.
    pub session_lifetime_secs: u64,
    /// Server-side secret mixed into every password hash.
    pub pepper: Option<String>,
    pub min_password_length: usize,
}

impl AuthConfig {
    /// The session lifetime as a chrono duration, or `None` when the
    /// configured seconds do not fit one.
    pub fn session_lifetime(&self) -> Option<Duration> {
        i64::try_from(self.session_lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // 30 days
            session_lifetime_secs: 30 * 24 * 60 * 60,
            pepper: None,
            min_password_length: 6,
        }
    }
}
