//! Task repository as seen by one browser session.
//!
//! Every call resolves the current user from the session token before
//! touching data, and every failure collapses into a "nothing changed"
//! value: an empty list, `None`, or `false`. Callers never see errors.

use chrono::{DateTime, Utc};
use surrealdb::Connection;
use todo_core::models::task::{CreateTask, Priority, Task, UpdateTask, is_blank_title};
use todo_core::repository::TaskRepository;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::Backend;

/// A task as entered by the user. The owner is filled in from the
/// session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Owner-scoped task operations for the holder of `token`.
pub struct UserTasks<'a, C: Connection> {
    backend: &'a Backend<C>,
    token: Option<&'a str>,
}

impl<'a, C: Connection> UserTasks<'a, C> {
    pub fn new(backend: &'a Backend<C>, token: Option<&'a str>) -> Self {
        Self { backend, token }
    }

    async fn owner_id(&self) -> Option<Uuid> {
        let Some(token) = self.token else {
            warn!("Task request without a session");
            return None;
        };
        match self.backend.auth.current_user(token).await {
            Ok(Some(user)) => Some(user.id),
            Ok(None) => {
                warn!("Task request with an unknown or expired session");
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to resolve current user");
                None
            }
        }
    }

    /// All tasks of the current user, newest first.
    pub async fn list_tasks(&self) -> Vec<Task> {
        let Some(owner_id) = self.owner_id().await else {
            return Vec::new();
        };
        match self.backend.tasks.list_by_owner(owner_id).await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(owner_id = %owner_id, error = %e, "Error fetching tasks");
                Vec::new()
            }
        }
    }

    /// Insert a task for the current user. Blank titles are a no-op.
    pub async fn add_task(&self, new: NewTask) -> Option<Task> {
        if is_blank_title(&new.title) {
            debug!("Rejected task with blank title");
            return None;
        }
        let owner_id = self.owner_id().await?;
        let input = CreateTask {
            owner_id,
            title: new.title,
            description: new.description,
            due_date: new.due_date,
            priority: new.priority,
        };
        match self.backend.tasks.create(input).await {
            Ok(task) => {
                info!(owner_id = %owner_id, task_id = %task.id, "Task added");
                Some(task)
            }
            Err(e) => {
                error!(owner_id = %owner_id, error = %e, "Error adding task");
                None
            }
        }
    }

    /// Apply `patch` to one of the current user's tasks.
    pub async fn update_task(&self, id: Uuid, patch: UpdateTask) -> Option<Task> {
        if patch.title.as_deref().is_some_and(is_blank_title) {
            debug!(task_id = %id, "Rejected update with blank title");
            return None;
        }
        let owner_id = self.owner_id().await?;
        match self.backend.tasks.update(owner_id, id, patch).await {
            Ok(task) => {
                info!(owner_id = %owner_id, task_id = %id, "Task updated");
                Some(task)
            }
            Err(e) => {
                error!(owner_id = %owner_id, task_id = %id, error = %e, "Error updating task");
                None
            }
        }
    }

    /// Flip `is_completed` relative to the copy the caller holds.
    pub async fn toggle_complete(&self, task: &Task) {
        let patch = UpdateTask {
            is_completed: Some(!task.is_completed),
            ..Default::default()
        };
        self.update_task(task.id, patch).await;
    }

    /// Delete one task. Returns whether a row was removed.
    pub async fn delete_task(&self, id: Uuid) -> bool {
        let Some(owner_id) = self.owner_id().await else {
            return false;
        };
        match self.backend.tasks.delete(owner_id, id).await {
            Ok(()) => {
                info!(owner_id = %owner_id, task_id = %id, "Task deleted");
                true
            }
            Err(e) => {
                error!(owner_id = %owner_id, task_id = %id, error = %e, "Error deleting task");
                false
            }
        }
    }

    pub async fn delete_completed(&self) {
        let Some(owner_id) = self.owner_id().await else {
            return;
        };
        match self.backend.tasks.delete_completed(owner_id).await {
            Ok(removed) => info!(owner_id = %owner_id, removed, "Completed tasks cleared"),
            Err(e) => error!(owner_id = %owner_id, error = %e, "Error clearing completed tasks"),
        }
    }

    pub async fn delete_all(&self) {
        let Some(owner_id) = self.owner_id().await else {
            return;
        };
        match self.backend.tasks.delete_all(owner_id).await {
            Ok(removed) => info!(owner_id = %owner_id, removed, "All tasks cleared"),
            Err(e) => error!(owner_id = %owner_id, error = %e, "Error clearing all tasks"),
        }
    }
}
