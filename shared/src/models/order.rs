//! Order Model
//!
//! The order aggregate: one owner, a denormalized client snapshot and a
//! non-empty list of lines. `total` and `total_items` are derived from the
//! lines and recomputed server-side on every write.

use serde::{Deserialize, Serialize};

/// Shipping address snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
}

/// Contact snapshot captured at order time. Not re-validated against any
/// other store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
}

/// One (funko, quantity, unit price, line total) tuple.
///
/// `price` is the unit price snapshot taken when the order was validated;
/// it is never re-checked afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub funko_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub total: f64,
}

impl OrderLine {
    pub fn new(funko_id: i64, quantity: i64, price: f64) -> Self {
        Self {
            funko_id,
            quantity,
            price,
            total: quantity as f64 * price,
        }
    }
}

/// Order aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub client: ClientInfo,
    pub order_lines: Vec<OrderLine>,
    pub total_items: i64,
    pub total: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Sum of line quantities.
    pub fn computed_total_items(lines: &[OrderLine]) -> i64 {
        lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of line totals.
    pub fn computed_total(lines: &[OrderLine]) -> f64 {
        lines.iter().map(|line| line.quantity as f64 * line.price).sum()
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub user_id: i64,
    pub client: ClientInfo,
    pub order_lines: Vec<OrderLine>,
}

/// Update order payload. Updating replaces the lines wholesale; the
/// previous reservation is released before the new lines are reserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub user_id: i64,
    pub client: ClientInfo,
    pub order_lines: Vec<OrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_derive_from_lines() {
        let lines = vec![OrderLine::new(1, 2, 5.0), OrderLine::new(2, 1, 2.0)];
        assert_eq!(Order::computed_total_items(&lines), 3);
        assert_eq!(Order::computed_total(&lines), 12.0);
    }

    #[test]
    fn line_total_is_quantity_times_price() {
        let line = OrderLine::new(7, 3, 9.99);
        assert_eq!(line.total, 3.0 * 9.99);
    }
}
