//! Order Validator
//!
//! Pure line validation against a snapshot of inventory state. The caller
//! fetches stock levels for the distinct funko ids in one batch and hands
//! them in; nothing here touches the store, so validation can run any
//! number of times without side effects.
//!
//! The stock check is advisory: the authoritative enforcement is the
//! conditional decrement applied at reservation time. What validation
//! guarantees is the price snapshot and the line arithmetic.

use std::collections::HashMap;

use shared::models::OrderLine;

use super::OrderError;
use crate::db::repository::funko::StockLevel;

/// Validate proposed order lines against current inventory.
///
/// Checks, in order:
/// 1. every referenced funko exists (all missing ids are reported at once)
/// 2. per line: positive quantity, sufficient stock, price matches the
///    funko's current price, and `total == quantity * price`
///
/// Empty input is the caller's problem; the service rejects it with a
/// distinct error before ever calling this.
pub fn validate_lines(
    lines: &[OrderLine],
    inventory: &HashMap<i64, StockLevel>,
) -> Result<(), OrderError> {
    let mut missing: Vec<i64> = lines
        .iter()
        .map(|line| line.funko_id)
        .filter(|id| !inventory.contains_key(id))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        missing.dedup();
        return Err(OrderError::UnknownFunkos(missing));
    }

    for line in lines {
        let item = &inventory[&line.funko_id];

        if line.quantity <= 0 {
            return Err(OrderError::InvalidQuantity {
                id: line.funko_id,
                quantity: line.quantity,
            });
        }
        if line.quantity > item.stock {
            return Err(OrderError::InsufficientStock {
                id: line.funko_id,
                requested: line.quantity,
                available: item.stock,
            });
        }
        if line.price != item.price {
            return Err(OrderError::PriceMismatch {
                id: line.funko_id,
                expected: item.price,
                actual: line.price,
            });
        }
        let expected_total = line.quantity as f64 * line.price;
        if line.total != expected_total {
            return Err(OrderError::TotalMismatch {
                id: line.funko_id,
                expected: expected_total,
                actual: line.total,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(entries: &[(i64, i64, f64)]) -> HashMap<i64, StockLevel> {
        entries
            .iter()
            .map(|&(id, stock, price)| (id, StockLevel { stock, price }))
            .collect()
    }

    fn line(funko_id: i64, quantity: i64, price: f64) -> OrderLine {
        OrderLine::new(funko_id, quantity, price)
    }

    #[test]
    fn accepts_valid_lines() {
        let inv = inventory(&[(1, 10, 5.0), (2, 3, 2.0)]);
        let lines = vec![line(1, 2, 5.0), line(2, 1, 2.0)];
        assert!(validate_lines(&lines, &inv).is_ok());
    }

    #[test]
    fn reports_every_missing_funko() {
        let inv = inventory(&[(7, 10, 5.0)]);
        let lines = vec![line(7, 1, 5.0), line(8, 1, 1.0), line(9, 1, 1.0)];
        match validate_lines(&lines, &inv) {
            Err(OrderError::UnknownFunkos(ids)) => assert_eq!(ids, vec![8, 9]),
            other => panic!("expected UnknownFunkos, got {other:?}"),
        }
    }

    #[test]
    fn rejects_insufficient_stock() {
        let inv = inventory(&[(1, 3, 5.0)]);
        let lines = vec![line(1, 4, 5.0)];
        match validate_lines(&lines, &inv) {
            Err(OrderError::InsufficientStock {
                id,
                requested,
                available,
            }) => {
                assert_eq!((id, requested, available), (1, 4, 3));
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn rejects_price_drift() {
        let inv = inventory(&[(1, 10, 5.0)]);
        let lines = vec![line(1, 2, 3.0)];
        match validate_lines(&lines, &inv) {
            Err(OrderError::PriceMismatch {
                id,
                expected,
                actual,
            }) => {
                assert_eq!(id, 1);
                assert_eq!(expected, 5.0);
                assert_eq!(actual, 3.0);
            }
            other => panic!("expected PriceMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_line_total() {
        let inv = inventory(&[(1, 10, 5.0)]);
        let mut bad = line(1, 2, 5.0);
        bad.total = 11.0;
        match validate_lines(&[bad], &inv) {
            Err(OrderError::TotalMismatch {
                id,
                expected,
                actual,
            }) => {
                assert_eq!(id, 1);
                assert_eq!(expected, 10.0);
                assert_eq!(actual, 11.0);
            }
            other => panic!("expected TotalMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let inv = inventory(&[(1, 10, 5.0)]);
        let lines = vec![line(1, 0, 5.0)];
        assert!(matches!(
            validate_lines(&lines, &inv),
            Err(OrderError::InvalidQuantity { id: 1, quantity: 0 })
        ));
    }

    #[test]
    fn validation_is_repeatable() {
        let inv = inventory(&[(1, 10, 5.0)]);
        let lines = vec![line(1, 2, 5.0)];
        for _ in 0..3 {
            assert!(validate_lines(&lines, &inv).is_ok());
        }
    }
}
