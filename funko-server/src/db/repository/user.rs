//! User Repository
//!
//! Roles are stored as a JSON array in a TEXT column and parsed into the
//! closed [`Role`] set on the way out; rows with unknown role names are
//! rejected rather than silently widened.

use super::{RepoError, RepoResult};
use shared::models::{Role, User, UserUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

const USER_SELECT: &str =
    "SELECT id, username, password_hash, roles, is_active, created_at, updated_at FROM user";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    roles: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles: Vec<Role> = serde_json::from_str(&row.roles)
            .map_err(|e| RepoError::Database(format!("Corrupt roles for user {}: {e}", row.id)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            roles,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn roles_json(roles: &[Role]) -> RepoResult<String> {
    serde_json::to_string(roles).map_err(|e| RepoError::Database(e.to_string()))
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{USER_SELECT} WHERE is_active = 1 ORDER BY username");
    let rows = sqlx::query_as::<_, UserRow>(&sql).fetch_all(pool).await?;
    rows.into_iter().map(User::try_from).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(User::try_from).transpose()
}

/// Same lookup for callers already inside a transaction.
pub async fn find_by_id_conn(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(User::try_from).transpose()
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE username = ?");
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    row.map(User::try_from).transpose()
}

pub async fn exists_by_username(pool: &SqlitePool, username: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    roles: &[Role],
) -> RepoResult<User> {
    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, username, password_hash, roles, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(roles_json(roles)?)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Partial update; `password_hash` must already be hashed by the caller.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: UserUpdate,
    password_hash: Option<String>,
) -> RepoResult<User> {
    let now = now_millis();
    let roles = data.roles.as_deref().map(roles_json).transpose()?;
    let rows = sqlx::query(
        "UPDATE user SET username = COALESCE(?1, username), password_hash = COALESCE(?2, password_hash), roles = COALESCE(?3, roles), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.username)
    .bind(password_hash)
    .bind(roles)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query("UPDATE user SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
