//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Initialize tracing for the process.
///
/// `RUST_LOG` wins over the configured filter. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&log.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let _ = if log.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
