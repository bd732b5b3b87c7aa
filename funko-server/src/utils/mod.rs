//! Shared utilities: error types and logging setup.

pub mod error;
pub mod logger;

pub use error::{ok, AppError, AppResponse, AppResult};
pub use logger::init_logger;
