//! Layered configuration loading using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TODO_*` prefix, `__` as separator)
//! 2. `todo.toml` in the working directory
//! 3. Built-in defaults
//!
//! `TODO_DATABASE__URL=mem://` maps to `database.url`, and so on.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use todo_auth::AuthConfig;
use todo_auth::config::MAX_SESSION_LIFETIME_SECS;
use todo_db::DbConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// HTTP listener and cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure` (enable behind TLS).
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TodoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DbConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl TodoConfig {
    /// Load configuration from `todo.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the working directory first, then [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let local_path = PathBuf::from("todo.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TODO_").split("__"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.session_lifetime_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.session_lifetime_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.auth.session_lifetime_secs > MAX_SESSION_LIFETIME_SECS {
            return Err(ConfigError::InvalidValue {
                field: "auth.session_lifetime_secs".into(),
                reason: format!("must be at most {MAX_SESSION_LIFETIME_SECS} seconds"),
            });
        }
        if self.auth.min_password_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.min_password_length".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_correct() {
        let config = TodoConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.secure_cookies);
        assert_eq!(config.database.namespace, "todo");
        assert_eq!(config.auth.min_password_length, 6);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "todo.toml",
                r#"
[server]
port = 9000

[database]
url = "mem://"
"#,
            )?;

            let config = TodoConfig::load().expect("config loads");
            assert_eq!(config.server.port, 9000);
            assert!(config.database.is_in_memory());
            assert_eq!(config.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn env_beats_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("todo.toml", "[server]\nport = 9000\n")?;
            jail.set_env("TODO_SERVER__PORT", "9191");
            jail.set_env("TODO_AUTH__PEPPER", "shh");

            let config = TodoConfig::load().expect("config loads");
            assert_eq!(config.server.port, 9191);
            assert_eq!(config.auth.pepper.as_deref(), Some("shh"));
            Ok(())
        });
    }

    #[test]
    fn zero_session_lifetime_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("TODO_AUTH__SESSION_LIFETIME_SECS", "0");
            assert!(matches!(
                TodoConfig::load(),
                Err(ConfigError::InvalidValue { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn oversized_session_lifetime_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("TODO_AUTH__SESSION_LIFETIME_SECS", "100000000000000000");
            let ConfigError::InvalidValue { field, .. } = TodoConfig::load().unwrap_err() else {
                panic!("expected an invalid value error");
            };
            assert_eq!(field, "auth.session_lifetime_secs");
            Ok(())
        });
    }

    #[test]
    fn ten_year_session_lifetime_is_accepted() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "todo.toml",
                &format!("[auth]\nsession_lifetime_secs = {MAX_SESSION_LIFETIME_SECS}\n"),
            )?;
            let config = TodoConfig::load().expect("config loads");
            assert_eq!(config.auth.session_lifetime_secs, MAX_SESSION_LIFETIME_SECS);
            Ok(())
        });
    }
}
