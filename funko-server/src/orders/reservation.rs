//! Stock Reservation
//!
//! Applies or reverses the stock deltas implied by an order's lines.
//! Both run on a connection inside the caller's write transaction:
//! when `reserve` fails halfway, the caller drops the transaction and the
//! decrements already applied roll back with it, so stock is never left
//! partially reserved.

use shared::models::OrderLine;
use sqlx::SqliteConnection;

use super::OrderError;
use crate::db::repository::funko;

/// Reserve stock for every line, sequentially.
///
/// Each line is a conditional decrement (`stock >= quantity`), so two
/// reservations racing for the same funko cannot drive stock negative;
/// the loser fails here with `InsufficientStock`.
pub async fn reserve(conn: &mut SqliteConnection, lines: &[OrderLine]) -> Result<(), OrderError> {
    for line in lines {
        let applied = funko::reserve_stock(conn, line.funko_id, line.quantity).await?;
        if !applied {
            let available = funko::current_stock(conn, line.funko_id).await?;
            return Err(OrderError::InsufficientStock {
                id: line.funko_id,
                requested: line.quantity,
                available,
            });
        }
    }
    Ok(())
}

/// Give the reserved stock back. Used on delete and as the first step of
/// update. Never fails on business grounds; only a store failure can
/// surface, and that aborts the enclosing transaction.
pub async fn release(conn: &mut SqliteConnection, lines: &[OrderLine]) -> Result<(), OrderError> {
    for line in lines {
        funko::release_stock(conn, line.funko_id, line.quantity).await?;
    }
    Ok(())
}
