//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Task operations take the
//! caller's `owner_id` on every call so a user can never read or
//! mutate another user's rows.

use uuid::Uuid;

use crate::error::TodoResult;
use crate::models::{
    session::{CreateSession, Session},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = TodoResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TodoResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = TodoResult<User>> + Send;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = TodoResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = TodoResult<Session>> + Send;
    /// Invalidate a single session.
    fn invalidate(&self, id: Uuid) -> impl Future<Output = TodoResult<()>> + Send;
    /// Invalidate all sessions for a user.
    fn invalidate_user_sessions(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = TodoResult<()>> + Send;
    /// Remove all expired sessions, returning how many were removed.
    fn cleanup_expired(&self) -> impl Future<Output = TodoResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Tasks (owner-scoped)
// ---------------------------------------------------------------------------

pub trait TaskRepository: Send + Sync {
    /// Insert a task for `input.owner_id`. Rejects blank titles.
    fn create(&self, input: CreateTask) -> impl Future<Output = TodoResult<Task>> + Send;
    fn get_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TodoResult<Task>> + Send;
    /// All tasks of one owner, newest first.
    fn list_by_owner(&self, owner_id: Uuid) -> impl Future<Output = TodoResult<Vec<Task>>> + Send;
    fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        input: UpdateTask,
    ) -> impl Future<Output = TodoResult<Task>> + Send;
    /// Hard delete. `NotFound` when no row of this owner matched.
    fn delete(&self, owner_id: Uuid, id: Uuid) -> impl Future<Output = TodoResult<()>> + Send;
    /// Delete every completed task of the owner, returning the count.
    fn delete_completed(&self, owner_id: Uuid) -> impl Future<Output = TodoResult<u64>> + Send;
    /// Delete every task of the owner, returning the count.
    fn delete_all(&self, owner_id: Uuid) -> impl Future<Output = TodoResult<u64>> + Send;
}
