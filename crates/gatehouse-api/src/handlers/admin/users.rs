//! Admin user management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use gatehouse_auth::rbac::{actions, objects};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::Repository;
use gatehouse_core::types::ListResponse;
use gatehouse_entity::user::{User, UserPatch, UserStatus};

use crate::dto::request::{CreateUserRequest, UpdateUserRequest};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ListParams, ListColumns, ValidatedJson};
use crate::state::AppState;

const USER_LIST: ListColumns = ListColumns {
    filters: &["role", "status"],
    search: &["first_name", "last_name", "email"],
};

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<User>>, ApiError> {
    auth.require(&state, objects::USER, actions::VIEW_ALL)?;

    let query = params.into_query(&USER_LIST)?;
    let (data, total_count) = state.stores.users.list(&query).await?;
    Ok(Json(ListResponse::new(data, total_count)))
}

/// GET /admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    auth.require(&state, objects::USER, actions::VIEW_ALL)?;
    Ok(Json(find_user(&state, &id).await?))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    auth.require(&state, objects::USER, actions::CREATE_ALL)?;
    ensure_known_role(&state, &req.role)?;
    ensure_can_manage(&state, &auth.role, &req.role)?;
    state.password_validator.validate(&req.password)?;

    let hash = state.password_hasher.hash_password(&req.password)?;
    let user = User::new(
        &req.email,
        req.phone.as_deref(),
        req.first_name,
        req.last_name,
        hash,
        req.role,
    );
    let user = state.stores.users.create(&user).await?;

    tracing::info!(user_id = %user.id, by = %auth.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    auth.require(&state, objects::USER, actions::UPDATE_ALL)?;
    let target = find_user(&state, &id).await?;
    ensure_can_manage(&state, &auth.role, &target.role)?;

    if let Some(role) = &req.role {
        ensure_known_role(&state, role)?;
        ensure_can_manage(&state, &auth.role, role)?;
    }
    let password_hash = match &req.password {
        Some(password) => {
            state.password_validator.validate(password)?;
            Some(state.password_hasher.hash_password(password)?)
        }
        None => None,
    };

    let patch = UserPatch {
        email: req.email,
        phone: req.phone,
        first_name: req.first_name,
        last_name: req.last_name,
        password_hash,
        role: req.role,
        status: req.status,
        ..UserPatch::default()
    }
    .normalized();

    if patch.is_empty() {
        return Err(AppError::validation("No fields to update").into());
    }
    if !state.stores.users.update(&id, &patch).await? {
        return Err(AppError::not_found(format!("User {id} not found")).into());
    }

    if matches!(patch.status, Some(UserStatus::Blocked | UserStatus::Deleted)) {
        state.stores.sessions.block_all_for_user(&id).await?;
    }

    tracing::info!(user_id = %id, by = %auth.id, "User updated");
    Ok(Json(find_user(&state, &id).await?))
}

/// DELETE /admin/users/{id}
///
/// Soft delete: the record keeps its id with status `deleted`, which frees
/// its email and phone for reuse.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require(&state, objects::USER, actions::DELETE_ALL)?;
    let target = find_user(&state, &id).await?;
    ensure_can_manage(&state, &auth.role, &target.role)?;

    let patch = UserPatch {
        status: Some(UserStatus::Deleted),
        ..UserPatch::default()
    };
    state.stores.users.update(&id, &patch).await?;
    let revoked = state.stores.sessions.block_all_for_user(&id).await?;

    tracing::info!(user_id = %id, by = %auth.id, revoked, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_user(state: &AppState, id: &Uuid) -> AppResult<User> {
    state
        .stores
        .users
        .find_by_id(id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
}

fn ensure_known_role(state: &AppState, role: &str) -> AppResult<()> {
    let auth = &state.config.auth;
    if auth.app_roles.iter().chain(&auth.portal_roles).any(|r| r == role) {
        Ok(())
    } else {
        Err(AppError::validation(format!("Unknown role '{role}'")))
    }
}

/// The caller may only create or manage identities whose role its own role
/// reaches through the grouping hierarchy.
fn ensure_can_manage(state: &AppState, caller_role: &str, target_role: &str) -> AppResult<()> {
    let reachable = state.rbac.snapshot().reachable_roles(caller_role);
    if reachable.iter().any(|r| r == target_role) {
        Ok(())
    } else {
        tracing::warn!(caller_role, target_role, "Role escalation denied");
        Err(AppError::forbidden(format!(
            "Role '{caller_role}' cannot manage identities with role '{target_role}'"
        )))
    }
}
