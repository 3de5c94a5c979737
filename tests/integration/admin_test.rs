//! Admin management of identities and sessions.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{STRONG_PASSWORD, TestApp};

#[tokio::test]
async fn test_admin_can_create_user() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/admin/users",
            Some(json!({
                "email": "New.Person@Test.com",
                "first_name": "New",
                "last_name": "Person",
                "password": STRONG_PASSWORD,
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["email"], "new.person@test.com");
    assert_eq!(response.body["role"], "user");
    assert_eq!(response.body["status"], "active");

    app.login("new.person@test.com", STRONG_PASSWORD, "app").await;
}

#[tokio::test]
async fn test_create_user_rejections() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let weak = app
        .request(
            "POST",
            "/admin/users",
            Some(json!({ "email": "a@test.com", "first_name": "A", "password": "password" })),
            Some(&token),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);

    let bad_role = app
        .request(
            "POST",
            "/admin/users",
            Some(json!({
                "email": "b@test.com",
                "first_name": "B",
                "password": STRONG_PASSWORD,
                "role": "wizard",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(bad_role.error_code(), "VALIDATION_ERROR");

    let duplicate = app
        .request(
            "POST",
            "/admin/users",
            Some(json!({
                "email": "ADMIN@test.com",
                "first_name": "Dup",
                "password": STRONG_PASSWORD,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_cannot_reach_superadmin() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let root = app
        .create_test_user("root@test.com", STRONG_PASSWORD, "superadmin")
        .await;
    let member = app
        .create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;

    let minted = app
        .request(
            "POST",
            "/admin/users",
            Some(json!({
                "email": "mint@test.com",
                "first_name": "Mint",
                "password": STRONG_PASSWORD,
                "role": "superadmin",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(minted.status, StatusCode::FORBIDDEN, "{:?}", minted.body);
    assert_eq!(minted.error_code(), "FORBIDDEN");

    let promoted = app
        .request(
            "PATCH",
            &format!("/admin/users/{member}"),
            Some(json!({ "role": "superadmin" })),
            Some(&token),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::FORBIDDEN);

    let blocked = app
        .request(
            "PATCH",
            &format!("/admin/users/{root}"),
            Some(json!({ "status": "blocked" })),
            Some(&token),
        )
        .await;
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);

    let deleted = app
        .request("DELETE", &format!("/admin/users/{root}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::FORBIDDEN);

    // The superadmin is untouched and can still sign in.
    app.login("root@test.com", STRONG_PASSWORD, "portal").await;

    // Peers and lower roles stay manageable.
    let promoted = app
        .request(
            "PATCH",
            &format!("/admin/users/{member}"),
            Some(json!({ "role": "admin" })),
            Some(&token),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK, "{:?}", promoted.body);
    assert_eq!(promoted.body["role"], "admin");
}

#[tokio::test]
async fn test_superadmin_can_mint_superadmin() {
    let app = TestApp::new();
    app.create_test_user("root@test.com", STRONG_PASSWORD, "superadmin")
        .await;
    let token = app.login("root@test.com", STRONG_PASSWORD, "portal").await;

    let response = app
        .request(
            "POST",
            "/admin/users",
            Some(json!({
                "email": "second@test.com",
                "first_name": "Second",
                "password": STRONG_PASSWORD,
                "role": "superadmin",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["role"], "superadmin");
}

#[tokio::test]
async fn test_blocking_user_revokes_sessions() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let id = app
        .create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;
    let login = app.login_body("member@test.com", STRONG_PASSWORD, "app").await;

    let response = app
        .request(
            "PATCH",
            &format!("/admin/users/{id}"),
            Some(json!({ "status": "blocked" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["status"], "blocked");

    let refresh = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": login["refresh_token"] })),
            None,
        )
        .await;
    assert_eq!(refresh.error_code(), "INVALID_REFRESH_TOKEN");

    let relogin = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({
                "email": "member@test.com",
                "password": STRONG_PASSWORD,
                "grant_type": "app",
            })),
            None,
        )
        .await;
    assert_eq!(relogin.error_code(), "USER_BLOCKED");
}

#[tokio::test]
async fn test_empty_update_rejected() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let id = app
        .create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;

    let response = app
        .request("PATCH", &format!("/admin/users/{id}"), Some(json!({})), Some(&token))
        .await;
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_deleted_user_is_gone() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let id = app
        .create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;

    let deleted = app
        .request("DELETE", &format!("/admin/users/{id}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let fetched = app
        .request("GET", &format!("/admin/users/{id}"), None, Some(&token))
        .await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);

    let login = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({
                "email": "member@test.com",
                "password": STRONG_PASSWORD,
                "grant_type": "app",
            })),
            None,
        )
        .await;
    assert_eq!(login.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_revoke_session_is_idempotent() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    app.create_test_user("member@test.com", STRONG_PASSWORD, "user")
        .await;
    let login = app.login_body("member@test.com", STRONG_PASSWORD, "app").await;

    let sessions = app
        .request("GET", "/admin/sessions?pp=0&s=-created_at", None, Some(&token))
        .await;
    assert_eq!(sessions.body["total_count"], 2);
    let session_id = sessions.body["data"][0]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let revoked = app
            .request(
                "POST",
                &format!("/admin/sessions/{session_id}/revoke"),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(revoked.status, StatusCode::OK);
        assert_eq!(revoked.body["is_blocked"], true);
    }

    let refresh = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": login["refresh_token"] })),
            None,
        )
        .await;
    assert_eq!(refresh.error_code(), "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_delete_unknown_session() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let response = app
        .request(
            "DELETE",
            "/admin/sessions/00000000-0000-0000-0000-000000000000",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
