//! Order Repository
//!
//! Orders span two tables (orders + order_line). Every function takes a
//! `&mut SqliteConnection` so the order service can run multi-step
//! mutations inside one transaction; line order is preserved through the
//! `line_idx` column.

use super::{RepoError, RepoResult};
use shared::models::{Address, ClientInfo, Order, OrderLine};
use sqlx::{FromRow, SqliteConnection};

const ORDER_SELECT: &str = "SELECT id, user_id, client_name, client_email, client_phone, client_street, client_city, client_zip, total_items, total, created_at, updated_at FROM orders";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    client_name: String,
    client_email: String,
    client_phone: String,
    client_street: String,
    client_city: String,
    client_zip: String,
    total_items: i64,
    total: f64,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, FromRow)]
struct LineRow {
    order_id: i64,
    funko_id: i64,
    quantity: i64,
    price: f64,
    line_total: f64,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            client: ClientInfo {
                name: self.client_name,
                email: self.client_email,
                phone: self.client_phone,
                address: Address {
                    street: self.client_street,
                    city: self.client_city,
                    zip: self.client_zip,
                },
            },
            order_lines: lines,
            total_items: self.total_items,
            total: self.total,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

async fn insert_lines(
    conn: &mut SqliteConnection,
    order_id: i64,
    lines: &[OrderLine],
) -> RepoResult<()> {
    for (idx, line) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_line (order_id, line_idx, funko_id, quantity, price, line_total) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(order_id)
        .bind(idx as i64)
        .bind(line.funko_id)
        .bind(line.quantity)
        .bind(line.price)
        .bind(line.total)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn lines_for_orders(
    conn: &mut SqliteConnection,
    order_ids: &[i64],
) -> RepoResult<Vec<LineRow>> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; order_ids.len()].join(", ");
    let sql = format!(
        "SELECT order_id, funko_id, quantity, price, line_total FROM order_line WHERE order_id IN ({placeholders}) ORDER BY order_id, line_idx",
    );
    let mut query = sqlx::query_as::<_, LineRow>(&sql);
    for id in order_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(&mut *conn).await?)
}

pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, user_id, client_name, client_email, client_phone, client_street, client_city, client_zip, total_items, total, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.client.name)
    .bind(&order.client.email)
    .bind(&order.client.phone)
    .bind(&order.client.address.street)
    .bind(&order.client.address.city)
    .bind(&order.client.address.zip)
    .bind(order.total_items)
    .bind(order.total)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;
    insert_lines(conn, order.id, &order.order_lines).await
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let lines = lines_for_orders(conn, &[id])
        .await?
        .into_iter()
        .map(|l| OrderLine {
            funko_id: l.funko_id,
            quantity: l.quantity,
            price: l.price,
            total: l.line_total,
        })
        .collect();
    Ok(Some(row.into_order(lines)))
}

/// Paginated listing, optionally scoped to one owner.
pub async fn find_scoped(
    conn: &mut SqliteConnection,
    limit: i64,
    offset: i64,
    owner: Option<i64>,
) -> RepoResult<Vec<Order>> {
    let rows = match owner {
        Some(user_id) => {
            let sql = format!("{ORDER_SELECT} WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
            sqlx::query_as::<_, OrderRow>(&sql)
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut *conn)
                .await?
        }
        None => {
            let sql = format!("{ORDER_SELECT} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
            sqlx::query_as::<_, OrderRow>(&sql)
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut *conn)
                .await?
        }
    };

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut lines_by_order: std::collections::HashMap<i64, Vec<OrderLine>> =
        std::collections::HashMap::new();
    for line in lines_for_orders(conn, &ids).await? {
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLine {
                funko_id: line.funko_id,
                quantity: line.quantity,
                price: line.price,
                total: line.line_total,
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let lines = lines_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(lines)
        })
        .collect())
}

pub async fn count_scoped(conn: &mut SqliteConnection, owner: Option<i64>) -> RepoResult<i64> {
    let count: i64 = match owner {
        Some(user_id) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&mut *conn)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM orders")
                .fetch_one(&mut *conn)
                .await?
        }
    };
    Ok(count)
}

/// Replace an order in place: row update plus wholesale line replacement.
pub async fn update(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET user_id = ?1, client_name = ?2, client_email = ?3, client_phone = ?4, client_street = ?5, client_city = ?6, client_zip = ?7, total_items = ?8, total = ?9, updated_at = ?10 WHERE id = ?11",
    )
    .bind(order.user_id)
    .bind(&order.client.name)
    .bind(&order.client.email)
    .bind(&order.client.phone)
    .bind(&order.client.address.street)
    .bind(&order.client.address.city)
    .bind(&order.client.address.zip)
    .bind(order.total_items)
    .bind(order.total)
    .bind(order.updated_at)
    .bind(order.id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {} not found", order.id)));
    }

    sqlx::query("DELETE FROM order_line WHERE order_id = ?")
        .bind(order.id)
        .execute(&mut *conn)
        .await?;
    insert_lines(conn, order.id, &order.order_lines).await
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    sqlx::query("DELETE FROM order_line WHERE order_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
