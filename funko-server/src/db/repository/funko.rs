//! Funko Repository
//!
//! Besides plain CRUD this owns the two stock mutations used by order
//! reservation. `reserve_stock` is a single conditional UPDATE so that a
//! decrement can never race stock below zero; `release_stock` is its
//! unconditional mirror.

use std::collections::HashMap;

use super::{RepoError, RepoResult};
use shared::models::{Funko, FunkoCreate, FunkoUpdate, FunkoWithCategory, DEFAULT_IMAGE};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const FUNKO_SELECT: &str =
    "SELECT id, name, price, stock, category_id, image, created_at, updated_at FROM funko";

const FUNKO_WITH_CATEGORY_SELECT: &str = "SELECT f.id, f.name, f.price, f.stock, f.category_id, c.name AS category_name, f.image, f.created_at, f.updated_at FROM funko f JOIN category c ON f.category_id = c.id";

/// Stock and price of one funko, as seen by the order validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockLevel {
    pub stock: i64,
    pub price: f64,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<FunkoWithCategory>> {
    let sql = format!("{FUNKO_WITH_CATEGORY_SELECT} ORDER BY f.name");
    let rows = sqlx::query_as::<_, FunkoWithCategory>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Funko>> {
    let sql = format!("{FUNKO_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Funko>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn exists_by_name(pool: &SqlitePool, name: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM funko WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn create(pool: &SqlitePool, data: FunkoCreate) -> RepoResult<Funko> {
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO funko (id, name, price, stock, category_id, image, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.price)
    .bind(data.stock)
    .bind(data.category_id)
    .bind(data.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create funko".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: FunkoUpdate) -> RepoResult<Funko> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE funko SET name = COALESCE(?1, name), price = COALESCE(?2, price), stock = COALESCE(?3, stock), category_id = COALESCE(?4, category_id), image = COALESCE(?5, image), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.name)
    .bind(data.price)
    .bind(data.stock)
    .bind(data.category_id)
    .bind(data.image)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Funko {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Funko {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM funko WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ========== Stock operations (order reservation) ==========

/// Batch stock/price lookup for the distinct funko ids of an order.
/// Ids absent from the result simply don't exist.
pub async fn stock_levels(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> RepoResult<HashMap<i64, StockLevel>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT id, stock, price FROM funko WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, (i64, i64, f64)>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(&mut *conn).await?;
    Ok(rows
        .into_iter()
        .map(|(id, stock, price)| (id, StockLevel { stock, price }))
        .collect())
}

/// Atomically decrement stock, but only if enough is available.
/// Returns false when the condition failed (insufficient stock or
/// unknown id); nothing is changed in that case.
pub async fn reserve_stock(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i64,
) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE funko SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1",
    )
    .bind(quantity)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Add released stock back. Never fails on business grounds; an unknown
/// id affects zero rows and is ignored.
pub async fn release_stock(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i64,
) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query("UPDATE funko SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3")
        .bind(quantity)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Current stock of one funko, for error reporting.
pub async fn current_stock(conn: &mut SqliteConnection, id: i64) -> RepoResult<i64> {
    let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM funko WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(stock.unwrap_or(0))
}
