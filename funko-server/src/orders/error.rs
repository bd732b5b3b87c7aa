//! Order Business Rule Errors

use crate::db::repository::RepoError;

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order must have at least one order line")]
    Empty,

    #[error("User {0} does not exist")]
    UnknownUser(i64),

    #[error("Funko ids not found: {}", join_ids(.0))]
    UnknownFunkos(Vec<i64>),

    #[error("Funko {id}: requested {requested} but only {available} in stock")]
    InsufficientStock {
        id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Funko {id}: price is {expected}, order line says {actual}")]
    PriceMismatch { id: i64, expected: f64, actual: f64 },

    #[error("Funko {id}: line total should be {expected}, got {actual}")]
    TotalMismatch { id: i64, expected: f64, actual: f64 },

    #[error("Funko {id}: quantity must be positive, got {quantity}")]
    InvalidQuantity { id: i64, quantity: i64 },

    #[error("Not allowed to create orders for other users")]
    Forbidden,

    #[error("Order {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Storage(#[from] RepoError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Storage(RepoError::from(err))
    }
}
