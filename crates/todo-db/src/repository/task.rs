//! SurrealDB implementation of [`TaskRepository`].
//!
//! Every statement carries `WHERE owner_id = $owner_id`, so a record id
//! that belongs to somebody else behaves exactly like a missing one.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use todo_core::error::{TodoError, TodoResult};
use todo_core::models::task::{CreateTask, Priority, Task, UpdateTask, is_blank_title};
use todo_core::repository::TaskRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TaskRow {
    owner_id: String,
    title: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: Option<String>,
    is_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TaskRowWithId {
    record_id: String,
    owner_id: String,
    title: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: Option<String>,
    is_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_priority(raw: Option<String>) -> Result<Option<Priority>, DbError> {
    raw.map(|p| {
        p.parse::<Priority>()
            .map_err(|_| DbError::Decode(format!("unknown task priority: {p}")))
    })
    .transpose()
}

impl TaskRow {
    fn into_task(self, id: Uuid) -> Result<Task, DbError> {
        let owner_id = Uuid::parse_str(&self.owner_id)
            .map_err(|e| DbError::Decode(format!("invalid owner UUID: {e}")))?;
        Ok(Task {
            id,
            owner_id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: parse_priority(self.priority)?,
            is_completed: self.is_completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TaskRowWithId {
    fn try_into_task(self) -> Result<Task, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid task UUID: {e}")))?;
        TaskRow {
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            is_completed: self.is_completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_task(id)
    }
}

fn blank_title() -> TodoError {
    TodoError::Validation {
        message: "Task cannot be empty".into(),
    }
}

/// SurrealDB implementation of the Task repository.
#[derive(Clone)]
pub struct SurrealTaskRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTaskRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Delete matching rows of one owner and report how many went away.
    async fn delete_where(&self, owner_id: Uuid, filter: &str) -> TodoResult<u64> {
        let query = format!("DELETE task WHERE owner_id = $owner_id{filter} RETURN BEFORE");

        let result = self
            .db
            .query(query)
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}

impl<C: Connection> TaskRepository for SurrealTaskRepository<C> {
    async fn create(&self, input: CreateTask) -> TodoResult<Task> {
        if is_blank_title(&input.title) {
            return Err(blank_title());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('task', $id) SET \
                 owner_id = $owner_id, \
                 title = $title, \
                 description = $description, \
                 due_date = $due_date, \
                 priority = $priority, \
                 is_completed = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("title", input.title.trim().to_string()))
            .bind(("description", input.description))
            .bind(("due_date", input.due_date))
            .bind(("priority", input.priority.map(|p| p.as_str().to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row.into_task(id)?)
    }

    async fn get_by_id(&self, owner_id: Uuid, id: Uuid) -> TodoResult<Task> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('task', $id) \
                 WHERE owner_id = $owner_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row.into_task(id)?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> TodoResult<Vec<Task>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task \
                 WHERE owner_id = $owner_id \
                 ORDER BY created_at DESC, id DESC",
            )
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRowWithId> = result.take(0).map_err(DbError::from)?;

        let tasks = rows
            .into_iter()
            .map(TaskRowWithId::try_into_task)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(tasks)
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, input: UpdateTask) -> TodoResult<Task> {
        if input.title.as_deref().is_some_and(is_blank_title) {
            return Err(blank_title());
        }

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.due_date.is_some() {
            sets.push("due_date = $due_date");
        }
        if input.priority.is_some() {
            sets.push("priority = $priority");
        }
        if input.is_completed.is_some() {
            sets.push("is_completed = $is_completed");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('task', $id) SET {} \
             WHERE owner_id = $owner_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("owner_id", owner_id.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title.trim().to_string()));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(due_date) = input.due_date {
            builder = builder.bind(("due_date", due_date));
        }
        if let Some(priority) = input.priority {
            builder = builder.bind(("priority", priority.map(|p| p.as_str().to_string())));
        }
        if let Some(is_completed) = input.is_completed {
            builder = builder.bind(("is_completed", is_completed));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row.into_task(id)?)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> TodoResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "DELETE type::record('task', $id) \
                 WHERE owner_id = $owner_id RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "task".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn delete_completed(&self, owner_id: Uuid) -> TodoResult<u64> {
        self.delete_where(owner_id, " AND is_completed = true").await
    }

    async fn delete_all(&self, owner_id: Uuid) -> TodoResult<u64> {
        self.delete_where(owner_id, "").await
    }
}
