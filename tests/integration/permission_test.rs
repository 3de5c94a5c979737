//! Role-based access to the admin surface.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{STRONG_PASSWORD, TestApp, test_config};

#[tokio::test]
async fn test_admin_can_access_admin_endpoints() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let users = app.request("GET", "/admin/users", None, Some(&token)).await;
    assert_eq!(users.status, StatusCode::OK);

    let sessions = app.request("GET", "/admin/sessions", None, Some(&token)).await;
    assert_eq!(sessions.status, StatusCode::OK);
    assert_eq!(sessions.body["total_count"], 1);
}

#[tokio::test]
async fn test_user_cannot_access_admin_endpoints() {
    let app = TestApp::new();
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;
    let token = app.login("member@test.com", STRONG_PASSWORD, "app").await;

    for path in ["/admin/users", "/admin/sessions"] {
        let response = app.request("GET", path, None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{path}");
        assert_eq!(response.error_code(), "FORBIDDEN");
    }

    let me = app.request("GET", "/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_use_app_grant() {
    let app = TestApp::new();
    app.create_test_user("boss@test.com", STRONG_PASSWORD, "admin")
        .await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({
                "email": "boss@test.com",
                "password": STRONG_PASSWORD,
                "grant_type": "app",
            })),
            None,
        )
        .await;

    assert_eq!(response.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_configured_role_inherits_permissions() {
    let mut config = test_config();
    config.auth.portal_roles.push("auditor".to_string());
    config.rbac.policies.push([
        "auditor".to_string(),
        "session".to_string(),
        "view_all".to_string(),
    ]);
    config.rbac.groupings.push(["auditor".to_string(), "user".to_string()]);
    let app = TestApp::with_config(config);

    app.create_test_user("audit@test.com", STRONG_PASSWORD, "auditor")
        .await;
    let token = app.login("audit@test.com", STRONG_PASSWORD, "portal").await;

    let sessions = app.request("GET", "/admin/sessions", None, Some(&token)).await;
    assert_eq!(sessions.status, StatusCode::OK);

    let me = app.request("GET", "/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);

    let users = app.request("GET", "/admin/users", None, Some(&token)).await;
    assert_eq!(users.status, StatusCode::FORBIDDEN);
}
