//! Funko catalog backend.
//!
//! A catalog of collectible funkos with categories, users and orders.
//! Order placement reserves inventory atomically; every other surface is
//! conventional CRUD plumbing around the SQLite store, with change events
//! fanned out over a websocket and hot reads served from a response cache.

pub mod api;
pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod notifications;
pub mod orders;
pub mod services;
pub mod utils;

pub use utils::{AppError, AppResponse, AppResult};
