//! SurrealDB repository implementations.

mod session;
mod task;
mod user;

pub use session::SurrealSessionRepository;
pub use task::SurrealTaskRepository;
pub use user::{SurrealUserRepository, hash_password};
