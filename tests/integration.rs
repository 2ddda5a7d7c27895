//! Integration tests: health, auth (register/login/refresh/me), schedules and classes.
//!
//! The router runs over the in-memory repositories, so no database is needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;
use uni_schedule::auth::HmacJwtManager;
use uni_schedule::repositories::{
    MemoryClassRepository, MemoryScheduleRepository, MemoryTokenRepository, MemoryUserRepository,
};
use uni_schedule::services::{AuthService, ClassService, ScheduleService};
use uni_schedule::{create_app, AppState};

fn test_app() -> axum::Router {
    let jwt = Arc::new(HmacJwtManager::new(
        "test-access-secret-min-32-chars!!".to_string(),
        "test-refresh-secret-min-32-chars!".to_string(),
        Duration::minutes(15),
        Duration::days(30),
    ));
    let schedules = Arc::new(MemoryScheduleRepository::new());
    let state = AppState {
        auth_service: AuthService::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryTokenRepository::new()),
            jwt,
            "test-salt".to_string(),
        ),
        schedule_service: ScheduleService::new(schedules.clone()),
        class_service: ClassService::new(
            Arc::new(MemoryClassRepository::new((*schedules).clone())),
            schedules,
        ),
    };
    create_app(state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register(app: &axum::Router, username: &str) -> Value {
    let (status, pair) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register should succeed");
    pair
}

fn access(pair: &Value) -> &str {
    pair["access_token"].as_str().unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_app();
    let (status, json) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn register_login_and_me() {
    let app = test_app();
    register(&app, "alice").await;

    let (status, pair) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login should succeed");
    assert!(pair["refresh_token"].as_str().is_some());

    let (status, me) = send(&app, "GET", "/auth/me", Some(access(&pair)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["role"], "student");
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_register_and_bad_login() {
    let app = test_app();
    register(&app, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for (username, password) in [("alice", "wrong-password"), ("nobody", "password123")] {
        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid login or password");
    }
}

#[tokio::test]
async fn register_validates_input() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "al", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "  ab  ", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    register(&app, "  carol  ").await;
    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "carol", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_superseded_token() {
    let app = test_app();
    let first = register(&app, "alice").await;
    let r1 = first["refresh_token"].clone();

    let (status, second) = send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": r1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(second["refresh_token"], r1);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": r1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": second["refresh_token"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let app = test_app();
    let (status, _) = send(&app, "GET", "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/schedules", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn class_lifecycle_with_ownership() {
    let app = test_app();
    let owner = register(&app, "alice").await;
    let stranger = register(&app, "mallory").await;

    let (status, schedule) = send(
        &app,
        "POST",
        "/schedules",
        Some(access(&owner)),
        Some(json!({ "title": "Group 101" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let schedule_id = schedule["id"].as_i64().unwrap();

    let (status, created) = send(
        &app,
        "POST",
        "/classes",
        Some(access(&owner)),
        Some(json!({
            "schedule_id": schedule_id,
            "title": "Algebra",
            "weekday": 1,
            "number": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let class_id = created["id"].as_i64().unwrap();
    let class_uri = format!("/classes/{}", class_id);

    let (status, _) = send(
        &app,
        "PATCH",
        &class_uri,
        Some(access(&stranger)),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, class) = send(&app, "GET", &class_uri, None, None).await;
    assert_eq!(class["title"], "Algebra");

    let (status, _) = send(
        &app,
        "PATCH",
        &class_uri,
        Some(access(&owner)),
        Some(json!({ "room": "204" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        "/classes",
        Some(access(&owner)),
        Some(json!({
            "schedule_id": 9999,
            "title": "Orphan",
            "weekday": 1,
            "number": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = send(
        &app,
        "GET",
        &format!("/schedules/{}/classes", schedule_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(|a| a.len()), Some(1));
    assert_eq!(list[0]["room"], "204");
    assert_eq!(list[0]["parity"], "always");

    let (status, _) = send(&app, "DELETE", &class_uri, Some(access(&stranger)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &class_uri, Some(access(&owner)), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &class_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
