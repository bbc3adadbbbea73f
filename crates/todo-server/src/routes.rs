//! HTTP handlers.
//!
//! Pages are rendered on the server; every successful mutation answers
//! with `303 /tasks` so the browser re-fetches the list.

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use serde::{Deserialize, Serialize};
use todo_core::models::user::User;
use tracing::{error, warn};
use uuid::Uuid;

use crate::auth_form::{AuthFailure, AuthForm, AuthMode, AuthSubmission};
use crate::html;
use crate::state::AppState;
use crate::tasks::UserTasks;
use crate::view::{NoticeLevel, TaskForm, TaskListView};

pub const SESSION_COOKIE: &str = "todo_session";

#[derive(Serialize)]
pub struct Response {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GateQuery {
    pub mode: Option<AuthMode>,
}

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub edit: Option<Uuid>,
    pub confirm_delete: Option<Uuid>,
}

fn session_token(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let secs = state.backend.auth.config().session_lifetime_secs;
    let lifetime = i64::try_from(secs).unwrap_or(i64::MAX);
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .max_age(time::Duration::seconds(lifetime))
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn html_page(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(header::ContentType::html())
        .body(body)
}

fn unauthorized() -> HttpResponse {
    html_page(StatusCode::UNAUTHORIZED, html::unauthorized_page())
}

/// Eagerly resolve the user behind the request's session cookie.
async fn signed_in_user(state: &AppState, req: &HttpRequest) -> Option<(String, User)> {
    let token = session_token(req)?;
    match state.backend.auth.current_user(&token).await {
        Ok(Some(user)) => Some((token, user)),
        Ok(None) => None,
        Err(e) => {
            error!(error = %e, "Failed to resolve session");
            None
        }
    }
}

/// Re-render the list after a rejected or failed mutation.
fn view_response(email: &str, view: &TaskListView) -> HttpResponse {
    let status = match view.notice.as_ref().map(|n| n.level) {
        Some(NoticeLevel::Invalid) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(NoticeLevel::Failed) => StatusCode::INTERNAL_SERVER_ERROR,
        None => StatusCode::OK,
    };
    html_page(status, html::tasks_page(email, view))
}

#[get("/")]
pub async fn gate(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<GateQuery>,
) -> HttpResponse {
    if signed_in_user(&state, &req).await.is_some() {
        return redirect("/tasks");
    }
    let form = AuthForm::new(query.mode.unwrap_or_default());
    html_page(StatusCode::OK, html::auth_page(&form))
}

#[post("/auth")]
pub async fn authenticate(
    state: web::Data<AppState>,
    req: HttpRequest,
    submission: web::Form<AuthSubmission>,
) -> HttpResponse {
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    match AuthForm::submit(&state.backend.auth, submission.into_inner(), user_agent).await {
        Ok(signed_in) => HttpResponse::SeeOther()
            .cookie(session_cookie(&state, signed_in.token))
            .insert_header((header::LOCATION, "/tasks"))
            .finish(),
        Err(form) => {
            let status = match form.failure {
                Some(AuthFailure::Invalid) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::UNAUTHORIZED,
            };
            html_page(status, html::auth_page(&form))
        }
    }
}

#[post("/signout")]
pub async fn sign_out(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Some(token) = session_token(&req) {
        if let Err(e) = state.backend.auth.sign_out(&token).await {
            error!(error = %e, "Sign-out failed");
        }
    }
    HttpResponse::SeeOther()
        .cookie(removal_cookie())
        .insert_header((header::LOCATION, "/"))
        .finish()
}

#[get("/tasks")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<TasksQuery>,
) -> HttpResponse {
    let Some((token, user)) = signed_in_user(&state, &req).await else {
        return unauthorized();
    };
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    let mut view = TaskListView::load(&repo).await;

    if let Some(id) = query.edit {
        if !view.begin_edit(id) {
            warn!(task_id = %id, "Edit requested for unknown task");
        }
    } else if let Some(id) = query.confirm_delete {
        if !view.request_delete(id) {
            warn!(task_id = %id, "Delete requested for unknown task");
        }
    }

    html_page(StatusCode::OK, html::tasks_page(&user.email, &view))
}

#[post("/tasks")]
pub async fn add_task(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<TaskForm>,
) -> HttpResponse {
    let Some((token, user)) = signed_in_user(&state, &req).await else {
        return unauthorized();
    };
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    let mut view = TaskListView::load(&repo).await;

    if view.submit_new(&repo, form.into_inner()).await {
        redirect("/tasks")
    } else {
        view_response(&user.email, &view)
    }
}

#[post("/tasks/{id}/edit")]
pub async fn edit_task(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<Uuid>,
    form: web::Form<TaskForm>,
) -> HttpResponse {
    let Some((token, user)) = signed_in_user(&state, &req).await else {
        return unauthorized();
    };
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    let mut view = TaskListView::load(&repo).await;

    if !view.begin_edit(id.into_inner()) {
        return redirect("/tasks");
    }
    if view.save_edit(&repo, form.into_inner()).await {
        redirect("/tasks")
    } else {
        view_response(&user.email, &view)
    }
}

#[post("/tasks/{id}/toggle")]
pub async fn toggle_task(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> HttpResponse {
    let Some((token, _)) = signed_in_user(&state, &req).await else {
        return unauthorized();
    };
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    let mut view = TaskListView::load(&repo).await;
    view.toggle(&repo, id.into_inner()).await;
    redirect("/tasks")
}

#[post("/tasks/{id}/delete")]
pub async fn delete_task(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> HttpResponse {
    let Some((token, user)) = signed_in_user(&state, &req).await else {
        return unauthorized();
    };
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    let mut view = TaskListView::load(&repo).await;

    if !view.request_delete(id.into_inner()) {
        return redirect("/tasks");
    }
    if view.confirm_delete(&repo).await {
        redirect("/tasks")
    } else {
        view_response(&user.email, &view)
    }
}

#[post("/tasks/clear-completed")]
pub async fn clear_completed(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let Some((token, _)) = signed_in_user(&state, &req).await else {
        return unauthorized();
    };
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    repo.delete_completed().await;
    redirect("/tasks")
}

#[post("/tasks/clear-all")]
pub async fn clear_all(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let Some((token, _)) = signed_in_user(&state, &req).await else {
        return unauthorized();
    };
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    repo.delete_all().await;
    redirect("/tasks")
}

#[get("/health")]
pub async fn healthcheck() -> impl Responder {
    let response = Response {
        message: "Everything is working fine".to_string(),
    };
    HttpResponse::Ok().json(response)
}

pub async fn not_found() -> actix_web::Result<HttpResponse> {
    let response = Response {
        message: "Resource not found".to_string(),
    };
    Ok(HttpResponse::NotFound().json(response))
}

/// Register every route. The JSON 404 fallback is attached by the
/// caller with `default_service`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(gate)
        .service(authenticate)
        .service(sign_out)
        .service(list_tasks)
        .service(add_task)
        .service(clear_completed)
        .service(clear_all)
        .service(edit_task)
        .service(toggle_task)
        .service(delete_task)
        .service(healthcheck);
}
