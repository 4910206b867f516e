//! HTTP integration tests
//!
//! Drive the full router against an in-memory database and check status
//! codes and the response envelope.

use std::sync::Arc;

use api::{router::router, AppState};
use auth::{db, migrations, AdminService, AuthService};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";
const ROOT_EMAIL: &str = "root@example.com";
const PASSWORD: &str = "password123";

async fn create_test_app() -> Router {
    let pool = db::connect_in_memory().await.expect("Failed to open database");
    migrations::run_migrations(&pool).await.expect("Failed to migrate");

    let state = Arc::new(AppState::new(
        AuthService::new(pool.clone(), SECRET.to_string(), 3600),
        AdminService::new(pool, SECRET.to_string(), 3600),
    ));
    state
        .admin_service
        .seed_first_super_admin(ROOT_EMAIL, "Root", PASSWORD)
        .await
        .expect("Failed to seed");

    router(state)
}

/// Send a request and return the status with the parsed JSON body.
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn admin_login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_admin(app: &Router, token: &str, email: &str, role: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/admin",
        Some(token),
        Some(json!({
            "email": email,
            "name": "Staff Member",
            "password": PASSWORD,
            "role": role,
            "status": "active",
        })),
    )
    .await
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

// ============================================================================
// User endpoints
// ============================================================================

#[tokio::test]
async fn test_register_login_and_me() {
    let app = create_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "alice@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "active");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "identifier": "alice@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let app = create_test_app().await;
    let payload = json!({ "username": "alice", "email": "alice@example.com", "password": PASSWORD });

    send(&app, Method::POST, "/api/auth/register", None, Some(payload.clone())).await;
    let (status, body) = send(&app, Method::POST, "/api/auth/register", None, Some(payload)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(error_code(&body), "USERNAME_EXISTS");
}

#[tokio::test]
async fn test_invalid_payloads_are_validation_errors() {
    let app = create_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "al", "email": "alice@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (status, body) = send(&app, Method::POST, "/api/auth/login", None, Some(json!({ "identifier": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let app = create_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "identifier": "ghost", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");

    let (status, _) = send(&app, Method::GET, "/api/admin", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_token_cannot_reach_admin_routes() {
    let app = create_test_app().await;
    send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "alice@example.com", "password": PASSWORD })),
    )
    .await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "identifier": "alice", "password": PASSWORD })),
    )
    .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::GET, "/api/admin", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Admin endpoints
// ============================================================================

#[tokio::test]
async fn test_admin_lifecycle_over_http() {
    let app = create_test_app().await;
    let root = admin_login(&app, ROOT_EMAIL).await;

    let (status, body) = create_admin(&app, &root, "b@example.com", "editor").await;
    assert_eq!(status, StatusCode::CREATED);
    let b_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = create_admin(&app, &root, "c@example.com", "super_admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");

    let (_, me) = send(&app, Method::GET, "/api/admin/me", Some(&root), None).await;
    let root_id = me["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/{root_id}"),
        Some(&root),
        Some(json!({ "role": "editor" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let b = admin_login(&app, "b@example.com").await;
    let (status, _) = send(&app, Method::DELETE, &format!("/api/admin/{root_id}"), Some(&b), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/admin/{b_id}"), Some(&root), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, Method::GET, "/api/admin", Some(&root), None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/api/admin/{b_id}"), Some(&root), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, _) = send(&app, Method::GET, "/api/admin/me", Some(&b), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_inactive_admin_is_rejected() {
    let app = create_test_app().await;
    let root = admin_login(&app, ROOT_EMAIL).await;

    let (_, body) = create_admin(&app, &root, "ed@example.com", "editor").await;
    let ed_id = body["data"]["id"].as_i64().unwrap();
    let ed = admin_login(&app, "ed@example.com").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/{ed_id}"),
        Some(&root),
        Some(json!({ "status": "passive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/admin", Some(&ed), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "email": "ed@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn test_non_numeric_admin_id_is_validation_error() {
    let app = create_test_app().await;
    let root = admin_login(&app, ROOT_EMAIL).await;

    let (status, body) = send(&app, Method::GET, "/api/admin/abc", Some(&root), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid admin ID");
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
