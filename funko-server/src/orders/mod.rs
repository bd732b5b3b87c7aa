//! Order placement and inventory reservation.
//!
//! The one subsystem here that is more than plumbing. An order is only
//! persisted after its lines have been validated against live inventory
//! and the stock has been reserved; update releases the previous
//! reservation and re-reserves the replacement, and delete releases it
//! for good. Each mutation runs inside a single write transaction, so a
//! failure at any step leaves stock and the order store untouched.

mod access;
mod error;
mod reservation;
mod service;
mod validator;

pub use access::OrderAccess;
pub use error::OrderError;
pub use service::OrderService;
pub use validator::validate_lines;
