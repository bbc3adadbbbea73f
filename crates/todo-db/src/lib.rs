//! SurrealDB storage: connection, schema migrations
//! and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbConfig`], [`DbManager`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations for the `todo-core` traits

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
