//! Paging, sorting, filtering and search on the admin list endpoints.

use http::StatusCode;

use crate::helpers::{STRONG_PASSWORD, TestApp};

async fn seeded() -> (TestApp, String) {
    let app = TestApp::new();
    let token = app.admin_token().await;
    for (email, role) in [
        ("alice@test.com", "user"),
        ("bob@test.com", "user"),
        ("carol@test.com", "superadmin"),
    ] {
        app.create_test_user(email, STRONG_PASSWORD, role).await;
    }
    (app, token)
}

fn emails(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r["email"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_filter_by_role_and_sort() {
    let (app, token) = seeded().await;

    let response = app
        .request("GET", "/admin/users?role=user&s=-email", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["total_count"], 2);
    assert_eq!(emails(&response.body), ["bob@test.com", "alice@test.com"]);
}

#[tokio::test]
async fn test_paging_reports_total_count() {
    let (app, token) = seeded().await;

    let response = app
        .request("GET", "/admin/users?p=2&pp=3&s=email", None, Some(&token))
        .await;

    assert_eq!(response.body["total_count"], 4);
    assert_eq!(emails(&response.body), ["carol@test.com"]);

    let response = app
        .request("GET", "/admin/users?pp=0", None, Some(&token))
        .await;
    assert_eq!(response.body["data"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn test_search_prefix() {
    let (app, token) = seeded().await;

    let response = app
        .request("GET", "/admin/users?q=ca", None, Some(&token))
        .await;

    assert_eq!(emails(&response.body), ["carol@test.com"]);
}

#[tokio::test]
async fn test_json_filter_document() {
    let (app, token) = seeded().await;

    // f={"email__startswith":"a","role":"user"}
    let response = app
        .request(
            "GET",
            "/admin/users?f=%7B%22email__startswith%22%3A%22a%22%2C%22role%22%3A%22user%22%7D",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(emails(&response.body), ["alice@test.com"]);
}

#[tokio::test]
async fn test_hostile_filter_value_is_literal() {
    let (app, token) = seeded().await;

    // role = "user' OR '1'='1"
    let response = app
        .request(
            "GET",
            "/admin/users?role=user%27%20OR%20%271%27%3D%271",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total_count"], 0);
}

#[tokio::test]
async fn test_bad_list_parameters() {
    let (app, token) = seeded().await;

    for query in [
        "pp=ten",
        "f=%7Bnot-json",
        // f={"password_hash":"x"}
        "f=%7B%22password_hash%22%3A%22x%22%7D",
        "pp=9223372036854775807&p=3",
        "pp=1000&p=9223372036854775807",
    ] {
        let response = app
            .request("GET", &format!("/admin/users?{query}"), None, Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(response.error_code(), "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_bare_non_uuid_id_matches_nothing() {
    let (app, token) = seeded().await;

    // f="not-a-uuid"
    let response = app
        .request("GET", "/admin/users?f=%22not-a-uuid%22", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["total_count"], 0);
    assert_eq!(emails(&response.body), Vec::<String>::new());
}
