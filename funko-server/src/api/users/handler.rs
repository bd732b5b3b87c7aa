//! User API Handlers
//!
//! User administration is admin-only; the single exception is reading
//! your own account.

use axum::extract::{Path, State};
use axum::Json;

use crate::auth::{hash_password, CurrentUser};
use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::utils::{AppError, AppResult};
use shared::models::{UserCreate, UserResponse, UserUpdate};

fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".into()))
    }
}

/// GET /users - admin only
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(&user)?;
    let users = user_repo::find_all(state.db.pool()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/{id} - admin, or the user themselves
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    if !user.is_admin() && user.id != id {
        return Err(AppError::Forbidden("Admin role required".into()));
    }
    let found = user_repo::find_by_id(state.db.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    Ok(Json(found.into()))
}

/// POST /users - admin only, roles explicit
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&user)?;
    if payload.username.trim().is_empty() || payload.password.len() < 4 {
        return Err(AppError::Validation(
            "Username and a password of at least 4 characters are required".into(),
        ));
    }
    if payload.roles.is_empty() {
        return Err(AppError::Validation("At least one role is required".into()));
    }
    if user_repo::exists_by_username(state.db.pool(), &payload.username).await? {
        return Err(AppError::Conflict(format!(
            "Username {} already exists",
            payload.username
        )));
    }

    let password_hash = hash_password(&payload.password)?;
    let created = user_repo::create(
        state.db.pool(),
        &payload.username,
        &password_hash,
        &payload.roles,
    )
    .await?;
    tracing::info!(user_id = created.id, by = user.id, "User created");
    Ok(Json(created.into()))
}

/// PUT /users/{id} - admin only
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&user)?;
    if let Some(username) = &payload.username {
        if user_repo::exists_by_username(state.db.pool(), username).await? {
            return Err(AppError::Conflict(format!(
                "Username {username} already exists"
            )));
        }
    }
    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let updated = user_repo::update(state.db.pool(), id, payload, password_hash).await?;
    Ok(Json(updated.into()))
}

/// DELETE /users/{id} - admin only (soft delete)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    require_admin(&user)?;
    if user.id == id {
        return Err(AppError::Validation("Cannot delete your own account".into()));
    }
    let deleted = user_repo::delete(state.db.pool(), id).await?;
    Ok(Json(deleted))
}
