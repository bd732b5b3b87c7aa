//! Order API Handlers
//!
//! Thin adapters over [`OrderService`]: every endpoint requires an
//! authenticated requester, and all policy (ownership, validation,
//! reservation) lives in the service. Order responses are never cached.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{Order, OrderCreate, OrderUpdate, Page, PageQuery};

/// POST /orders
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = state.orders.create(payload, &user).await?;
    // The reservation changed funko stock: cached funko reads are stale now
    state.cache.invalidate("funko");
    Ok(Json(order))
}

/// GET /orders - paginated, scoped to the requester unless admin
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Order>>> {
    let page = state.orders.list(query, &user).await?;
    Ok(Json(page))
}

/// GET /orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.orders.get(id, &user).await?;
    Ok(Json(order))
}

/// PUT /orders/{id} - replaces the order lines (release + re-reserve)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<Order>> {
    let order = state.orders.update(id, payload, &user).await?;
    state.cache.invalidate("funko");
    Ok(Json(order))
}

/// DELETE /orders/{id} - terminal; releases the reservation
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.orders.remove(id, &user).await?;
    state.cache.invalidate("funko");
    Ok(Json(true))
}
