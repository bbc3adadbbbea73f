//! Domain models shared across all crates.

pub mod session;
pub mod task;
pub mod user;
