//! Shared domain models and DTOs for the Funko catalog backend.
//!
//! Everything that crosses a module or process boundary lives here:
//! entities, create/update payloads, pagination types and the change
//! notification payload. Database derives are feature-gated behind `db`
//! so non-server consumers stay free of sqlx.

pub mod message;
pub mod models;
pub mod util;
