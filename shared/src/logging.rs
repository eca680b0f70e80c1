//! Shared logging setup for consistent tracing across crates

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `level` is a default filter directive (e.g. "info", "reactor=debug");
/// the `RUST_LOG` environment variable still takes precedence. Safe to call
/// more than once; later calls are no-ops.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
