//! Tracing setup for front-ends.

use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr. `RUST_LOG` overrides the default `info` filter.
///
/// Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
