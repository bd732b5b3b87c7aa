//! Server core: configuration, shared state and router assembly.

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::{build_router, run};
pub use state::ServerState;
