//! Registration, login and profile flows.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "name": "Ada", "email": "Ada@Example.com", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.message(), "User registered successfully");
    assert!(response.data()["token"].is_string());
    assert!(response.data()["expiresAt"].is_string());
    assert_eq!(response.data()["user"]["email"], "ada@example.com");
    assert_eq!(response.data()["user"]["role"], "user");
    assert!(response.data()["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let app = TestApp::new();
    app.register_user("dup@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "name": "Other", "email": "dup@example.com", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.message(), "Email already registered");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "name": "A", "email": "not-an-email", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = response.body["errors"].as_array().expect("field errors");
    let fields: Vec<&str> = errors.iter().filter_map(|e| e["field"].as_str()).collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"name"));
}

#[tokio::test]
async fn test_weak_password_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "short" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = TestApp::new();
    app.register_user("ada@example.com").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "ada@example.com", "password": "Wrong1234" })),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.message(), "Invalid credentials");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::new();

    let missing = app.request("GET", "/api/auth/profile", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message(), "Authentication token required");

    let garbage = app
        .request("GET", "/api/auth/profile", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_read_and_update() {
    let app = TestApp::new();
    let token = app.register_user("ada@example.com").await;
    app.register_user("taken@example.com").await;

    let profile = app
        .request("GET", "/api/auth/profile", None, Some(&token))
        .await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.data()["email"], "ada@example.com");

    let conflict = app
        .request(
            "PUT",
            "/api/auth/profile",
            Some(json!({ "email": "taken@example.com" })),
            Some(&token),
        )
        .await;
    assert_eq!(conflict.status, StatusCode::BAD_REQUEST);
    assert_eq!(conflict.message(), "Email already in use");

    let renamed = app
        .request(
            "PUT",
            "/api/auth/profile",
            Some(json!({ "name": "Ada Lovelace" })),
            Some(&token),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.data()["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let app = TestApp::new();

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.data()["store"], "memory");

    let missing = app.request("GET", "/api/nothing-here", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["success"], false);
    assert_eq!(missing.message(), "Route not found");
}
