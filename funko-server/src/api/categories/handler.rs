//! Category API Handlers
//!
//! Reads are public and served through the response cache; mutations are
//! admin-only and broadcast a change event.

use axum::extract::{Path, State};
use axum::Json;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::category as category_repo;
use crate::utils::{AppError, AppResult};
use shared::message::ChangeAction;
use shared::models::{CategoryCreate, CategoryUpdate};

const RESOURCE: &str = "category";

fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".into()))
    }
}

/// GET /categories - all active categories (cached)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<serde_json::Value>> {
    if let Some(cached) = state.cache.get(RESOURCE, "all") {
        return Ok(Json(cached));
    }
    let categories = category_repo::find_all(state.db.pool()).await?;
    let value = serde_json::to_value(&categories)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache.put(RESOURCE, "all", value.clone());
    Ok(Json(value))
}

/// GET /categories/{id} (cached)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let key = id.to_string();
    if let Some(cached) = state.cache.get(RESOURCE, &key) {
        return Ok(Json(cached));
    }
    let category = category_repo::find_by_id(state.db.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))?;
    let value = serde_json::to_value(&category)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache.put(RESOURCE, &key, value.clone());
    Ok(Json(value))
}

/// POST /categories - admin only
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<shared::models::Category>> {
    require_admin(&user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Category name is required".into()));
    }
    if category_repo::exists_by_name(state.db.pool(), &payload.name).await? {
        return Err(AppError::Conflict(format!(
            "Category {} already exists",
            payload.name
        )));
    }

    let category = category_repo::create(state.db.pool(), payload).await?;
    state.broadcast_change(
        RESOURCE,
        ChangeAction::Created,
        category.id,
        serde_json::to_value(&category).ok(),
    );
    Ok(Json(category))
}

/// PUT /categories/{id} - admin only
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<shared::models::Category>> {
    require_admin(&user)?;
    if let Some(name) = &payload.name {
        if category_repo::exists_by_name(state.db.pool(), name).await? {
            return Err(AppError::Conflict(format!("Category {name} already exists")));
        }
    }

    let category = category_repo::update(state.db.pool(), id, payload).await?;
    state.broadcast_change(
        RESOURCE,
        ChangeAction::Updated,
        id,
        serde_json::to_value(&category).ok(),
    );
    Ok(Json(category))
}

/// DELETE /categories/{id} - admin only, refused while funkos reference it
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    require_admin(&user)?;
    let deleted = category_repo::delete(state.db.pool(), id).await?;
    if deleted {
        state.broadcast_change(RESOURCE, ChangeAction::Deleted, id, None);
    }
    Ok(Json(deleted))
}
