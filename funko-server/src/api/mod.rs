//! API Route Modules
//!
//! One module per resource, each exposing a `router()` merged in
//! [`crate::core::server::build_router`]:
//!
//! - [`health`] - liveness probe
//! - [`auth`] - sign-up / sign-in
//! - [`categories`] - category management
//! - [`funkos`] - funko management + image upload
//! - [`users`] - user administration
//! - [`orders`] - order placement and management
//! - [`storage`] - stored image retrieval

pub mod auth;
pub mod categories;
pub mod funkos;
pub mod health;
pub mod orders;
pub mod storage;
pub mod users;
