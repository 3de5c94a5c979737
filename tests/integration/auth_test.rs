//! Login, refresh and bearer authentication over HTTP.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{STRONG_PASSWORD, TestApp};

#[tokio::test]
async fn test_login_portal_success() {
    let app = TestApp::new();
    app.create_test_user("boss@test.com", STRONG_PASSWORD, "admin")
        .await;

    let body = app.login_body("boss@test.com", STRONG_PASSWORD, "portal").await;

    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 3600);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refresh_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_accepts_username_alias_and_mixed_case_email() {
    let app = TestApp::new();
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({
                "username": "  Member@Test.com ",
                "password": STRONG_PASSWORD,
                "grant_type": "app",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;

    let attempts = [
        ("member@test.com", "wrong-password", "app"),
        ("nobody@test.com", STRONG_PASSWORD, "app"),
        ("member@test.com", STRONG_PASSWORD, "portal"),
    ];

    for (email, password, grant) in attempts {
        let response = app
            .request(
                "POST",
                "/auth/login",
                Some(json!({ "email": email, "password": password, "grant_type": grant })),
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(response.body["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_login_unknown_grant_type() {
    let app = TestApp::new();
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({
                "email": "member@test.com",
                "password": STRONG_PASSWORD,
                "grant_type": "kiosk",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_GRANT_TYPE");
}

#[tokio::test]
async fn test_login_missing_fields_is_validation_error() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "", "password": "x", "grant_type": "app" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_refresh_returns_same_refresh_token() {
    let app = TestApp::new();
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;
    let login = app.login_body("member@test.com", STRONG_PASSWORD, "app").await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["refresh_token"], refresh_token);

    let me = app
        .request(
            "GET",
            "/users/me",
            None,
            response.body["access_token"].as_str(),
        )
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "member@test.com");
    assert!(me.body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_refresh_with_garbage_token() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": "not-a-token" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let app = TestApp::new();
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;
    let access = app.login("member@test.com", STRONG_PASSWORD, "app").await;

    let response = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": access })),
            None,
        )
        .await;

    assert_eq!(response.error_code(), "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_second_login_supersedes_first_session() {
    let app = TestApp::new();
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;
    let first = app.login_body("member@test.com", STRONG_PASSWORD, "app").await;
    app.login_body("member@test.com", STRONG_PASSWORD, "app").await;

    let response = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": first["refresh_token"] })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_missing_or_invalid_bearer() {
    let app = TestApp::new();

    let response = app.request("GET", "/users/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");

    let response = app
        .request("GET", "/users/me", None, Some("definitely.not.valid"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_then_login_with_new_one() {
    let app = TestApp::new();
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;
    let token = app.login("member@test.com", STRONG_PASSWORD, "app").await;
    let replacement = "violet-anchor-harbor-2048";

    let response = app
        .request(
            "PATCH",
            "/users/me/password",
            Some(json!({ "current_password": "wrong", "new_password": replacement })),
            Some(&token),
        )
        .await;
    assert_eq!(response.error_code(), "INVALID_CREDENTIALS");

    let response = app
        .request(
            "PATCH",
            "/users/me/password",
            Some(json!({ "current_password": STRONG_PASSWORD, "new_password": replacement })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    app.login("member@test.com", replacement, "app").await;
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], true);
}
