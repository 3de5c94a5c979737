//! Auth handlers: login and refresh.

use axum::Json;
use axum::extract::State;

use gatehouse_auth::LoginInput;
use gatehouse_entity::session::AuthToken;

use crate::dto::request::{LoginRequest, RefreshRequest};
use crate::error::ApiError;
use crate::extractors::{ClientInfo, ValidatedJson};
use crate::state::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthToken>, ApiError> {
    let token = state
        .session_manager
        .login(LoginInput {
            email: req.email,
            password: req.password,
            grant_type: req.grant_type,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        })
        .await?;
    Ok(Json(token))
}

/// POST /auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<AuthToken>, ApiError> {
    let token = state
        .session_manager
        .refresh(&req.refresh_token, &client.ip_address, &client.user_agent)
        .await?;
    Ok(Json(token))
}
