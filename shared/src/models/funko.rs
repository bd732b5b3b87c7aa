//! Funko Model

use serde::{Deserialize, Serialize};

/// Image assigned to funkos created without an upload.
pub const DEFAULT_IMAGE: &str = "default.png";

/// Funko entity (a catalog item with mutable stock and price)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Funko {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category_id: i64,
    pub image: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Funko with its category name joined in (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FunkoWithCategory {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category_id: i64,
    pub category_name: String,
    pub image: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create funko payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunkoCreate {
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category_id: i64,
    pub image: Option<String>,
}

/// Update funko payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunkoUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub category_id: Option<i64>,
    pub image: Option<String>,
}
