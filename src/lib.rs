pub mod app;
pub mod config;
pub mod database;
mod error;
pub mod web;

// re-export
pub use app::{App, AppState};
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Console tracing for local development.
/// Respects `RUST_LOG`, defaults to `debug`.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(false)
        .init();
}

/// Production tracing: no ANSI escapes, `info` by default.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .init();
}
