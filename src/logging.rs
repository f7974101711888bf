//! Logging configuration for the HogQL runner.
//!
//! Diagnostics go to stderr so that rendered results on stdout stay clean.
//! The filter defaults to `warn` and can be overridden with `RUST_LOG`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Initializes logging to stderr.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
