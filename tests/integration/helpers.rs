//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use gatehouse_api::{AppState, build_router};
use gatehouse_auth::PasswordHasher;
use gatehouse_core::config::{AppConfig, DatabaseDriver};
use gatehouse_core::traits::Repository;
use gatehouse_database::Stores;
use gatehouse_entity::user::User;

/// A password that clears the strength check.
pub const STRONG_PASSWORD: &str = "quartz-lantern-97-meadow";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Direct store access for seeding and assertions
    pub stores: Stores,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with a customized config
    pub fn with_config(config: AppConfig) -> Self {
        let stores = Stores::memory();
        let state =
            AppState::new(config.clone(), stores.clone()).expect("Failed to build app state");
        let router = build_router(state);

        Self {
            router,
            stores,
            config,
        }
    }

    /// Create a test user and return their ID
    pub async fn create_test_user(&self, email: &str, password: &str, role: &str) -> Uuid {
        let hash = PasswordHasher::new()
            .hash_password(password)
            .expect("Failed to hash password");
        let user = User::new(email, None, "Test", role, hash, role);

        self.stores
            .users
            .create(&user)
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Login and return the full token response body
    pub async fn login_body(&self, email: &str, password: &str, grant_type: &str) -> Value {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "grant_type": grant_type,
        });

        let response = self.request("POST", "/auth/login", Some(body), None).await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body
    }

    /// Login and return JWT access token
    pub async fn login(&self, email: &str, password: &str, grant_type: &str) -> String {
        self.login_body(email, password, grant_type).await["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Seed an admin and return its access token
    pub async fn admin_token(&self) -> String {
        self.create_test_user("admin@test.com", STRONG_PASSWORD, "admin")
            .await;
        self.login("admin@test.com", STRONG_PASSWORD, "portal").await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("User-Agent", "gatehouse-tests");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Config for the in-memory driver with a fixed signing secret
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.driver = DatabaseDriver::Memory;
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.session.cleanup_interval_seconds = 0;
    config
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The stable error code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
