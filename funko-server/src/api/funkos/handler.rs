//! Funko API Handlers
//!
//! Reads are public and cached; mutations are admin-only, keep the image
//! store in sync and broadcast change events.

use axum::extract::{Multipart, Path, State};
use axum::Json;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{category as category_repo, funko as funko_repo};
use crate::utils::{AppError, AppResult};
use shared::message::ChangeAction;
use shared::models::{Funko, FunkoCreate, FunkoUpdate};

const RESOURCE: &str = "funko";

fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".into()))
    }
}

async fn ensure_category_exists(state: &ServerState, category_id: i64) -> AppResult<()> {
    category_repo::find_by_id(state.db.pool(), category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {category_id} not found")))?;
    Ok(())
}

/// GET /funkos - all funkos with category names (cached)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<serde_json::Value>> {
    if let Some(cached) = state.cache.get(RESOURCE, "all") {
        return Ok(Json(cached));
    }
    let funkos = funko_repo::find_all(state.db.pool()).await?;
    let value = serde_json::to_value(&funkos).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache.put(RESOURCE, "all", value.clone());
    Ok(Json(value))
}

/// GET /funkos/{id} (cached)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let key = id.to_string();
    if let Some(cached) = state.cache.get(RESOURCE, &key) {
        return Ok(Json(cached));
    }
    let funko = funko_repo::find_by_id(state.db.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Funko {id} not found")))?;
    let value = serde_json::to_value(&funko).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache.put(RESOURCE, &key, value.clone());
    Ok(Json(value))
}

/// POST /funkos - admin only
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<FunkoCreate>,
) -> AppResult<Json<Funko>> {
    require_admin(&user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Funko name is required".into()));
    }
    if payload.price < 0.0 || payload.stock < 0 {
        return Err(AppError::Validation(
            "Price and stock must be non-negative".into(),
        ));
    }
    if funko_repo::exists_by_name(state.db.pool(), &payload.name).await? {
        return Err(AppError::Conflict(format!(
            "Funko {} already exists",
            payload.name
        )));
    }
    ensure_category_exists(&state, payload.category_id).await?;

    let funko = funko_repo::create(state.db.pool(), payload).await?;
    state.broadcast_change(
        RESOURCE,
        ChangeAction::Created,
        funko.id,
        serde_json::to_value(&funko).ok(),
    );
    Ok(Json(funko))
}

/// PUT /funkos/{id} - admin only
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<FunkoUpdate>,
) -> AppResult<Json<Funko>> {
    require_admin(&user)?;
    if let Some(name) = &payload.name {
        if funko_repo::exists_by_name(state.db.pool(), name).await? {
            return Err(AppError::Conflict(format!("Funko {name} already exists")));
        }
    }
    if payload.price.is_some_and(|p| p < 0.0) || payload.stock.is_some_and(|s| s < 0) {
        return Err(AppError::Validation(
            "Price and stock must be non-negative".into(),
        ));
    }
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let funko = funko_repo::update(state.db.pool(), id, payload).await?;
    state.broadcast_change(
        RESOURCE,
        ChangeAction::Updated,
        id,
        serde_json::to_value(&funko).ok(),
    );
    Ok(Json(funko))
}

/// DELETE /funkos/{id} - admin only; removes the stored image as well
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    require_admin(&user)?;
    let funko = funko_repo::find_by_id(state.db.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Funko {id} not found")))?;

    let deleted = funko_repo::delete(state.db.pool(), id).await?;
    if deleted {
        state.images.remove(&funko.image).await?;
        state.broadcast_change(RESOURCE, ChangeAction::Deleted, id, None);
    }
    Ok(Json(deleted))
}

/// PATCH /funkos/{id}/image - admin only, multipart field `file`
pub async fn upload_image(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<Funko>> {
    require_admin(&user)?;
    let funko = funko_repo::find_by_id(state.db.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Funko {id} not found")))?;

    let mut stored: Option<String> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                return Err(AppError::Validation("Uploaded file is empty".into()));
            }
            stored = Some(state.images.save(&bytes, content_type.as_deref()).await?);
        }
    }
    let image = stored.ok_or_else(|| AppError::Validation("Missing `file` field".into()))?;

    let updated = funko_repo::update(
        state.db.pool(),
        id,
        FunkoUpdate {
            name: None,
            price: None,
            stock: None,
            category_id: None,
            image: Some(image),
        },
    )
    .await?;

    // The replaced file is unreachable now; best effort cleanup
    state.images.remove(&funko.image).await?;

    state.broadcast_change(
        RESOURCE,
        ChangeAction::Updated,
        id,
        serde_json::to_value(&updated).ok(),
    );
    Ok(Json(updated))
}
