//! Logging Infrastructure
//!
//! Structured logging setup; level comes from `RUST_LOG` with a sane
//! default for the server crate.

use tracing_subscriber::EnvFilter;

/// Initialize the logger. Safe to call more than once (later calls are
/// no-ops), which keeps test setups simple.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,funko_server=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
