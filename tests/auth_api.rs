mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use planner_api::auth::TokenKeys;
use serde_json::json;
use uuid::Uuid;

use common::{TestApp, TEST_SECRET};

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Calendar API is running!");
}

#[tokio::test]
async fn register_returns_token_and_public_fields() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": " Ada ", "email": "Ada@Example.com", "password": "secret123" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert!(body["token"].as_str().unwrap().len() > 20);
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn registering_same_email_twice_is_rejected() {
    let app = TestApp::new().await;
    app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Other", "email": "ADA@example.com", "password": "another1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("User already exists"));
}

#[tokio::test]
async fn register_validates_input() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "ada@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name, email, and password are required");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "12345" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_part_was_wrong() {
    let app = TestApp::new().await;
    app.register("Ada", "ada@example.com").await;

    let (wrong_password_status, wrong_password) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "not-it" })),
        )
        .await;
    let (unknown_email_status, unknown_email) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
        )
        .await;

    assert_eq!(wrong_password_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_issues_working_token() {
    let app = TestApp::new().await;
    app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ADA@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");

    let token = body["token"].as_str().unwrap();
    let (status, me) = app.get("/api/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["name"], "Ada");
    assert!(me.get("password").is_none());
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn gated_routes_distinguish_missing_and_bad_tokens() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");

    let (status, body) = app.get("/api/events", "not.a.token").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or expired token");

    let expired = TokenKeys::new(TEST_SECRET, Duration::days(-1))
        .issue(Uuid::new_v4(), "ada@example.com")
        .unwrap();
    let (status, body) = app.get("/api/events", &expired).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn current_user_is_not_found_once_the_account_is_gone() {
    let app = TestApp::new().await;
    let token = TokenKeys::new(TEST_SECRET, Duration::days(1))
        .issue(Uuid::new_v4(), "ghost@example.com")
        .unwrap();

    let (status, body) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;
    let token = app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .post("/api/todos", &token, json!(["not", "an", "object"]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn password_change_replaces_the_hash() {
    let app = TestApp::new().await;
    let token = app.register("Ada", "ada@example.com").await;

    let (status, _) = app
        .put(
            "/api/auth/password",
            &token,
            json!({ "currentPassword": "wrong-one", "newPassword": "brandnew1" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .put(
            "/api/auth/password",
            &token,
            json!({ "currentPassword": "secret123", "newPassword": "abc" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 6 characters");
    assert!(body["fields"].is_object());

    let (status, _) = app
        .put(
            "/api/auth/password",
            &token,
            json!({ "currentPassword": "secret123", "newPassword": "brandnew1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (old_status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(old_status, StatusCode::UNAUTHORIZED);

    let (new_status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "brandnew1" })),
        )
        .await;
    assert_eq!(new_status, StatusCode::OK);
}
