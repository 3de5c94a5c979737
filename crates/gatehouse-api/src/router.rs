//! Route definitions for the Gatehouse HTTP API.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::panic_response;
use crate::handlers;
use crate::middleware::{cors::build_cors_layer, logging::request_logging};
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;
    let timeout = Duration::from_secs(server.request_timeout_seconds.max(1));
    let body_limit = server.body_limit_bytes;
    let cors = build_cors_layer(&server.cors);

    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(admin_routes())
        .route("/health", get(handlers::health::health))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Login and token refresh
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh-token", post(handlers::auth::refresh_token))
}

/// Self-service
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::me))
        .route("/users/me/password", patch(handlers::user::change_password))
}

fn admin_routes() -> Router<AppState> {
    use handlers::admin::{sessions, users};

    Router::new()
        .route("/admin/users", get(users::list_users).post(users::create_user))
        .route(
            "/admin/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/admin/sessions", get(sessions::list_sessions))
        .route(
            "/admin/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/admin/sessions/{id}/revoke", post(sessions::revoke_session))
}
