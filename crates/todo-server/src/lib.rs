//! Server-rendered todo list: session gate, auth form and per-user task
//! list on top of SurrealDB.

pub mod auth_form;
pub mod backend;
pub mod config;
pub mod html;
pub mod routes;
pub mod state;
pub mod tasks;
pub mod view;

pub use config::{ConfigError, TodoConfig};
pub use state::AppState;
