//! End-to-end tests of the HTTP surface against an in-memory database.

use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use todo_server::routes::{self, SESSION_COOKIE};
use todo_server::tasks::UserTasks;
use todo_server::{AppState, TodoConfig};

async fn state() -> web::Data<AppState> {
    let mut config = TodoConfig::default();
    config.database.url = "mem://".into();
    web::Data::new(AppState::build(&config).await.unwrap())
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .configure(routes::config)
                .default_service(web::route().to(routes::not_found)),
        )
        .await
    };
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn session_of<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

async fn body_text<B: MessageBody>(resp: actix_web::dev::ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

fn auth_request(email: &str, password: &str, mode: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/auth")
        .set_form([("email", email), ("password", password), ("mode", mode)])
}

fn task_form(title: &str) -> test::TestRequest {
    test::TestRequest::post().uri("/tasks").set_form([
        ("title", title),
        ("description", ""),
        ("due_date", ""),
        ("priority", "medium"),
    ])
}

#[actix_web::test]
async fn health_reports_ok() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Everything is working fine");
}

#[actix_web::test]
async fn unknown_route_is_json_404() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Resource not found");
}

#[actix_web::test]
async fn gate_shows_auth_form_without_session() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("<h1>Login</h1>"));
    assert!(html.contains("No account? Sign up"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/?mode=signup").to_request(),
    )
    .await;
    let html = body_text(resp).await;
    assert!(html.contains("<h1>Sign Up</h1>"));
    assert!(html.contains("Have an account? Log in"));
}

#[actix_web::test]
async fn sign_up_sets_session_cookie_and_gate_redirects() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        auth_request("new@example.com", "secret1", "signup").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/tasks");

    let cookie = session_of(&resp).unwrap();
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert!(cookie.max_age().is_some());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/tasks");
}

#[actix_web::test]
async fn failed_sign_in_rerenders_form_with_message() {
    let state = state().await;
    let app = app!(state);

    test::call_service(
        &app,
        auth_request("user@example.com", "secret1", "signup").to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        auth_request("user@example.com", "wrong-password", "signin").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(session_of(&resp).is_none());
    let html = body_text(resp).await;
    assert!(html.contains("Invalid login credentials"));
    assert!(html.contains("value=\"user@example.com\""));
}

#[actix_web::test]
async fn duplicate_sign_up_is_reported_inline() {
    let state = state().await;
    let app = app!(state);

    test::call_service(
        &app,
        auth_request("dup@example.com", "secret1", "signup").to_request(),
    )
    .await;
    let resp = test::call_service(
        &app,
        auth_request("dup@example.com", "secret1", "signup").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let html = body_text(resp).await;
    assert!(html.contains("User already registered"));
    assert!(html.contains("<h1>Sign Up</h1>"));
}

#[actix_web::test]
async fn sign_up_policy_failures_are_unprocessable() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        auth_request("short@example.com", "abc", "signup").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(session_of(&resp).is_none());
    let html = body_text(resp).await;
    assert!(html.contains("Password should be at least 6 characters"));

    let resp = test::call_service(
        &app,
        auth_request("not-an-email", "secret1", "signup").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn tasks_page_requires_a_session() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/tasks").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let html = body_text(resp).await;
    assert!(html.contains("Unauthorized"));
    assert!(html.contains("href=\"/\""));

    let resp = test::call_service(&app, task_form("Sneaky").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn add_list_toggle_edit_and_delete() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        auth_request("me@example.com", "secret1", "signup").to_request(),
    )
    .await;
    let cookie = session_of(&resp).unwrap();

    // Blank title never reaches the database.
    let resp = test::call_service(
        &app,
        task_form("   ").cookie(cookie.clone()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(resp).await.contains("Task cannot be empty"));

    let resp = test::call_service(
        &app,
        task_form("Buy milk").cookie(cookie.clone()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/tasks");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/tasks").cookie(cookie.clone()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Welcome, me@example.com"));
    assert!(html.contains("Buy milk"));
    assert!(html.contains("badge-secondary"));

    let token = cookie.value().to_string();
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    let task = repo.list_tasks().await.remove(0);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/tasks/{}/toggle", task.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(repo.list_tasks().await[0].is_completed);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/tasks?edit={}", task.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert!(body_text(resp).await.contains(&format!("/tasks/{}/edit", task.id)));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/tasks/{}/edit", task.id))
            .cookie(cookie.clone())
            .set_form([
                ("title", "Buy oat milk"),
                ("description", ""),
                ("due_date", "2026-11-03"),
                ("priority", "high"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let edited = repo.list_tasks().await.remove(0);
    assert_eq!(edited.title, "Buy oat milk");
    assert_eq!(edited.id, task.id);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/tasks?confirm_delete={}", task.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let html = body_text(resp).await;
    assert!(html.contains("Are you sure?"));
    assert!(html.contains("📅 Nov 03"));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/tasks/{}/delete", task.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(repo.list_tasks().await.is_empty());
}

#[actix_web::test]
async fn bulk_clear_routes() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        auth_request("bulk@example.com", "secret1", "signup").to_request(),
    )
    .await;
    let cookie = session_of(&resp).unwrap();
    for title in ["one", "two", "three"] {
        test::call_service(&app, task_form(title).cookie(cookie.clone()).to_request()).await;
    }

    let token = cookie.value().to_string();
    let repo = UserTasks::new(&state.backend, Some(token.as_str()));
    let first = repo.list_tasks().await.remove(0);
    repo.toggle_complete(&first).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/tasks/clear-completed")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let remaining = repo.list_tasks().await;
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|t| !t.is_completed));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/tasks/clear-all")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(repo.list_tasks().await.is_empty());
}

#[actix_web::test]
async fn sign_out_clears_cookie_and_session() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        auth_request("bye@example.com", "secret1", "signup").to_request(),
    )
    .await;
    let cookie = session_of(&resp).unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/signout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let removal = session_of(&resp).unwrap();
    assert_eq!(removal.value(), "");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/tasks").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
