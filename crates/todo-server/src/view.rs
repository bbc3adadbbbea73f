//! Task list view state.
//!
//! The view is an explicit value: the tasks last fetched from the
//! repository, what the user is doing with them, and an optional
//! notice. Every mutating operation re-fetches the authoritative list
//! afterwards instead of patching local state.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use surrealdb::Connection;
use todo_core::models::task::{Priority, Task, UpdateTask, is_blank_title};
use uuid::Uuid;

use crate::tasks::{NewTask, UserTasks};

pub const EMPTY_TITLE: &str = "Task cannot be empty";

/// Raw task fields as submitted by the add and edit forms.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub priority: String,
}

impl TaskForm {
    /// An empty add form; priority starts at medium.
    pub fn blank() -> Self {
        Self {
            priority: Priority::default().as_str().into(),
            ..Default::default()
        }
    }

    pub fn parse(&self) -> Result<NewTask, String> {
        if is_blank_title(&self.title) {
            return Err(EMPTY_TITLE.into());
        }
        let description = self.description.trim();
        Ok(NewTask {
            title: self.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            due_date: parse_due_date(&self.due_date)?,
            priority: parse_priority(&self.priority)?,
        })
    }
}

impl From<&Task> for TaskForm {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%dT%H:%M").to_string())
                .unwrap_or_default(),
            priority: task
                .priority
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Accepts `YYYY-MM-DD` and `YYYY-MM-DDTHH:MM[:SS]`, read as UTC.
pub fn parse_due_date(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(dt.and_utc()));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| Some(d.and_time(NaiveTime::MIN).and_utc()))
        .map_err(|_| format!("Invalid due date: {raw}"))
}

/// Empty means "no priority".
pub fn parse_priority(raw: &str) -> Result<Option<Priority>, String> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse::<Priority>()
        .map(Some)
        .map_err(|e| e.public_message())
}

/// Editable copy of one task, separate from the list.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub id: Uuid,
    pub form: TaskForm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    Browsing,
    ConfirmDelete(Uuid),
    Editing(TaskDraft),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Input rejected before any remote call.
    Invalid,
    /// The repository reported that nothing changed.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Invalid,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failed,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskListView {
    pub tasks: Vec<Task>,
    pub mode: ViewMode,
    pub notice: Option<Notice>,
    /// Contents of the add form, kept when a submission is rejected.
    pub new_task: TaskForm,
}

impl Default for TaskListView {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            mode: ViewMode::Browsing,
            notice: None,
            new_task: TaskForm::blank(),
        }
    }
}

impl TaskListView {
    pub async fn load<C: Connection>(repo: &UserTasks<'_, C>) -> Self {
        let mut view = Self::default();
        view.refresh(repo).await;
        view
    }

    pub async fn refresh<C: Connection>(&mut self, repo: &UserTasks<'_, C>) {
        self.tasks = repo.list_tasks().await;
    }

    pub fn find(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn has_error(&self) -> bool {
        self.notice.is_some()
    }

    /// Validate and add a task. Returns whether a task was created.
    pub async fn submit_new<C: Connection>(
        &mut self,
        repo: &UserTasks<'_, C>,
        form: TaskForm,
    ) -> bool {
        let new = match form.parse() {
            Ok(new) => new,
            Err(message) => {
                self.new_task = form;
                self.notice = Some(Notice::invalid(message));
                return false;
            }
        };

        let added = repo.add_task(new).await.is_some();
        if added {
            self.new_task = TaskForm::blank();
        } else {
            self.new_task = form;
            self.notice = Some(Notice::failed("Failed to add task"));
        }
        self.refresh(repo).await;
        added
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: Uuid) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.mode = ViewMode::ConfirmDelete(id);
        true
    }

    pub fn cancel_delete(&mut self) {
        if matches!(self.mode, ViewMode::ConfirmDelete(_)) {
            self.mode = ViewMode::Browsing;
        }
    }

    /// Delete the task awaiting confirmation, if any.
    pub async fn confirm_delete<C: Connection>(&mut self, repo: &UserTasks<'_, C>) -> bool {
        let ViewMode::ConfirmDelete(id) = self.mode else {
            return false;
        };
        self.mode = ViewMode::Browsing;

        let deleted = repo.delete_task(id).await;
        if !deleted {
            self.notice = Some(Notice::failed("Failed to delete task"));
        }
        self.refresh(repo).await;
        deleted
    }

    /// Open an editable copy of `id`.
    pub fn begin_edit(&mut self, id: Uuid) -> bool {
        let Some(task) = self.find(id) else {
            return false;
        };
        self.mode = ViewMode::Editing(TaskDraft {
            id,
            form: TaskForm::from(task),
        });
        true
    }

    pub fn cancel_edit(&mut self) {
        if matches!(self.mode, ViewMode::Editing(_)) {
            self.mode = ViewMode::Browsing;
        }
    }

    /// Commit the open draft with the submitted fields.
    pub async fn save_edit<C: Connection>(
        &mut self,
        repo: &UserTasks<'_, C>,
        form: TaskForm,
    ) -> bool {
        let (id, parsed) = match &mut self.mode {
            ViewMode::Editing(draft) => {
                draft.form = form;
                (draft.id, draft.form.parse())
            }
            _ => return false,
        };
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(message) => {
                self.notice = Some(Notice::invalid(message));
                return false;
            }
        };

        let patch = UpdateTask {
            title: Some(parsed.title),
            description: Some(parsed.description),
            due_date: Some(parsed.due_date),
            priority: Some(parsed.priority),
            is_completed: None,
        };
        let saved = repo.update_task(id, patch).await.is_some();
        if saved {
            self.mode = ViewMode::Browsing;
        } else {
            self.notice = Some(Notice::failed("Failed to update task"));
        }
        self.refresh(repo).await;
        saved
    }

    /// Flip completion of `id`. Fires immediately.
    pub async fn toggle<C: Connection>(&mut self, repo: &UserTasks<'_, C>, id: Uuid) -> bool {
        let Some(task) = self.find(id).cloned() else {
            return false;
        };
        repo.toggle_complete(&task).await;
        self.refresh(repo).await;
        true
    }

    pub async fn clear_completed<C: Connection>(&mut self, repo: &UserTasks<'_, C>) {
        repo.delete_completed().await;
        self.refresh(repo).await;
    }

    pub async fn clear_all<C: Connection>(&mut self, repo: &UserTasks<'_, C>) {
        repo.delete_all().await;
        self.refresh(repo).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form(title: &str) -> TaskForm {
        TaskForm {
            title: title.into(),
            ..TaskForm::blank()
        }
    }

    #[test]
    fn blank_form_defaults_to_medium() {
        assert_eq!(TaskForm::blank().priority, "medium");
        assert_eq!(form("x").parse().unwrap().priority, Some(Priority::Medium));
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(form("   ").parse().unwrap_err(), EMPTY_TITLE);
    }

    #[test]
    fn empty_optional_fields_become_none() {
        let parsed = TaskForm {
            title: " Buy milk ".into(),
            description: "  ".into(),
            due_date: String::new(),
            priority: String::new(),
        }
        .parse()
        .unwrap();
        assert_eq!(parsed.title, "Buy milk");
        assert_eq!(parsed.description, None);
        assert_eq!(parsed.due_date, None);
        assert_eq!(parsed.priority, None);
    }

    #[test]
    fn due_date_accepts_date_and_datetime() {
        assert_eq!(
            parse_due_date("2026-11-03").unwrap(),
            Some(Utc.with_ymd_and_hms(2026, 11, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_due_date("2026-11-03T17:30").unwrap(),
            Some(Utc.with_ymd_and_hms(2026, 11, 3, 17, 30, 0).unwrap())
        );
        assert!(parse_due_date("next tuesday").is_err());
    }

    #[test]
    fn unknown_priority_is_an_error() {
        assert!(parse_priority("urgent").is_err());
        assert_eq!(parse_priority("HIGH").unwrap(), Some(Priority::High));
    }

    #[test]
    fn form_from_task_round_trips_through_parse() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Buy milk".into(),
            description: None,
            due_date: Some(Utc.with_ymd_and_hms(2026, 11, 3, 8, 15, 0).unwrap()),
            priority: Some(Priority::Low),
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        let form = TaskForm::from(&task);
        assert_eq!(form.due_date, "2026-11-03T08:15");
        let parsed = form.parse().unwrap();
        assert_eq!(parsed.due_date, task.due_date);
        assert_eq!(parsed.priority, task.priority);
    }

    #[test]
    fn delete_and_edit_need_a_known_task() {
        let mut view = TaskListView::default();
        let id = Uuid::new_v4();
        assert!(!view.request_delete(id));
        assert!(!view.begin_edit(id));
        assert_eq!(view.mode, ViewMode::Browsing);
    }
}
