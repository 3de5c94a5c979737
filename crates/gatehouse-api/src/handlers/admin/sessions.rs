//! Admin session management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use gatehouse_auth::rbac::{actions, objects};
use gatehouse_core::error::AppError;
use gatehouse_core::traits::Repository;
use gatehouse_core::types::ListResponse;
use gatehouse_entity::session::Session;

use crate::error::ApiError;
use crate::extractors::{AuthUser, ListParams, ListColumns};
use crate::state::AppState;

const SESSION_LIST: ListColumns = ListColumns {
    filters: &["user_id", "is_blocked", "ip_address"],
    search: &["ip_address", "user_agent"],
};

/// GET /admin/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Session>>, ApiError> {
    auth.require(&state, objects::SESSION, actions::VIEW_ALL)?;

    let query = params.into_query(&SESSION_LIST)?;
    let (data, total_count) = state.stores.sessions.list(&query).await?;
    Ok(Json(ListResponse::new(data, total_count)))
}

/// GET /admin/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    auth.require(&state, objects::SESSION, actions::VIEW_ALL)?;

    let session = state
        .stores
        .sessions
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Session {id} not found")))?;
    Ok(Json(session))
}

/// POST /admin/sessions/{id}/revoke
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    auth.require(&state, objects::SESSION, actions::UPDATE_ALL)?;
    Ok(Json(state.session_manager.revoke(&id).await?))
}

/// DELETE /admin/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require(&state, objects::SESSION, actions::DELETE_ALL)?;

    if !state.stores.sessions.delete(&id).await? {
        return Err(AppError::not_found(format!("Session {id} not found")).into());
    }
    tracing::info!(session_id = %id, by = %auth.id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}
