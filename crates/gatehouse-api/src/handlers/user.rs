//! Self-service handlers for the authenticated identity.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use gatehouse_auth::rbac::{actions, objects};
use gatehouse_core::error::AppError;
use gatehouse_core::traits::Repository;
use gatehouse_entity::user::User;

use crate::dto::request::ChangePasswordRequest;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /users/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<User>, ApiError> {
    auth.require(&state, objects::USER, actions::VIEW)?;

    let user = state
        .stores
        .users
        .find_by_id(&auth.id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user))
}

/// PATCH /users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .session_manager
        .change_password(
            &auth.id,
            &req.current_password,
            &req.new_password,
            &state.password_validator,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
