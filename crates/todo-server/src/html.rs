//! Server-side HTML rendering.
//!
//! Plain string building; every piece of user-supplied text goes
//! through [`escape`] before it reaches the page.

use chrono::{DateTime, Utc};
use todo_core::models::task::{Priority, Task};

use crate::auth_form::{AuthForm, AuthMode};
use crate::view::{NoticeLevel, TaskForm, TaskListView, ViewMode};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Badge style for a priority.
pub fn priority_variant(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "destructive",
        Priority::Medium => "secondary",
        Priority::Low => "outline",
    }
}

/// `📅 Nov 03`
pub fn due_label(due: DateTime<Utc>) -> String {
    format!("📅 {}", due.format("%b %d"))
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<main class="container">
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn auth_page(form: &AuthForm) -> String {
    let mode = form.mode;
    let error = form
        .error
        .as_deref()
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape(e)))
        .unwrap_or_default();
    let toggle_href = match mode.toggled() {
        AuthMode::SignUp => "/?mode=signup",
        AuthMode::SignIn => "/",
    };

    let body = format!(
        r#"<section class="auth-card">
<h1>{title}</h1>
<form method="post" action="/auth">
<input type="hidden" name="mode" value="{mode_value}">
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" required></label>
{error}
<button type="submit">{title}</button>
</form>
<a class="auth-toggle" href="{toggle_href}">{prompt}</a>
</section>"#,
        title = mode.title(),
        mode_value = mode.as_str(),
        email = escape(&form.email),
        prompt = mode.toggle_prompt(),
    );
    page(mode.title(), &body)
}

pub fn unauthorized_page() -> String {
    page(
        "Unauthorized",
        r#"<section class="unauthorized">
<h1>Unauthorized</h1>
<p>You need to log in to see your tasks.</p>
<a href="/">Log in</a>
</section>"#,
    )
}

pub fn tasks_page(email: &str, view: &TaskListView) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        r#"<header class="header">
<h1>My Todo List</h1>
<p class="welcome">Welcome, {}</p>
<form method="post" action="/signout"><button type="submit">Sign out</button></form>
</header>
"#,
        escape(email)
    ));

    if let Some(notice) = &view.notice {
        let class = match notice.level {
            NoticeLevel::Invalid => "notice notice-invalid",
            NoticeLevel::Failed => "notice notice-failed",
        };
        body.push_str(&format!(
            "<p class=\"{class}\" role=\"status\">{}</p>\n",
            escape(&notice.message)
        ));
    }

    body.push_str(&task_form("/tasks", &view.new_task, "Add", None));

    if view.tasks.is_empty() {
        body.push_str("<p class=\"empty\">No tasks yet</p>\n");
    } else {
        body.push_str("<ul class=\"tasks\">\n");
        for task in &view.tasks {
            body.push_str(&task_item(task, &view.mode));
        }
        body.push_str("</ul>\n");
    }

    if let ViewMode::ConfirmDelete(id) = view.mode {
        body.push_str(&format!(
            r#"<div class="dialog" role="alertdialog">
<h2>Are you sure?</h2>
<p>If you proceed, this task will be permanently deleted and cannot be recovered.</p>
<form method="post" action="/tasks/{id}/delete"><button type="submit" class="destructive">Continue</button></form>
<a href="/tasks">Cancel</a>
</div>
"#
        ));
    }

    body.push_str(
        r#"<footer class="clear-actions">
<span>Manage your tasks</span>
<form method="post" action="/tasks/clear-completed"><button type="submit" class="outline">Clear Completed</button></form>
<form method="post" action="/tasks/clear-all"><button type="submit" class="destructive">Clear All</button></form>
</footer>
"#,
    );

    page("My Todo List", &body)
}

fn task_item(task: &Task, mode: &ViewMode) -> String {
    if let ViewMode::Editing(draft) = mode {
        if draft.id == task.id {
            let action = format!("/tasks/{}/edit", task.id);
            return format!(
                "<li class=\"task editing\">\n{}</li>\n",
                task_form(&action, &draft.form, "Save", Some("/tasks"))
            );
        }
    }

    let mut meta = String::new();
    if let Some(priority) = task.priority {
        meta.push_str(&format!(
            "<span class=\"badge badge-{}\">{}</span>",
            priority_variant(priority),
            priority
        ));
    }
    if let Some(due) = task.due_date {
        meta.push_str(&format!("<span class=\"due\">{}</span>", due_label(due)));
    }

    let description = task
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| format!("<p class=\"description\">{}</p>", escape(d)))
        .unwrap_or_default();

    format!(
        r#"<li class="task{done_class}">
<form method="post" action="/tasks/{id}/toggle"><input type="checkbox" aria-label="Toggle completion" onchange="this.form.submit()"{checked}><noscript><button type="submit">Toggle</button></noscript></form>
<span class="title">{title}</span>
{description}<div class="meta">{meta}</div>
<a href="/tasks?edit={id}">Edit</a>
<a href="/tasks?confirm_delete={id}" class="delete">Delete</a>
</li>
"#,
        id = task.id,
        done_class = if task.is_completed { " completed" } else { "" },
        checked = if task.is_completed { " checked" } else { "" },
        title = escape(&task.title),
    )
}

fn task_form(action: &str, form: &TaskForm, submit: &str, cancel: Option<&str>) -> String {
    let mut options = String::new();
    let choices = std::iter::once(("", "No priority"))
        .chain(Priority::ALL.iter().map(|p| (p.as_str(), p.as_str())));
    for (value, label) in choices {
        let selected = if form.priority.eq_ignore_ascii_case(value) {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!("<option value=\"{value}\"{selected}>{label}</option>"));
    }

    let cancel = cancel
        .map(|href| format!("<a href=\"{href}\">Cancel</a>"))
        .unwrap_or_default();

    format!(
        r#"<form method="post" action="{action}" class="task-form">
<input type="text" name="title" placeholder="Add a new task" value="{title}">
<textarea name="description" placeholder="Description">{description}</textarea>
<input type="datetime-local" name="due_date" value="{due_date}">
<select name="priority">{options}</select>
<button type="submit">{submit}</button>
{cancel}</form>
"#,
        title = escape(&form.title),
        description = escape(&form.description),
        due_date = escape(&form.due_date),
    )
}
