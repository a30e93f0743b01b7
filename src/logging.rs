//! Tracing subscriber setup for hosts embedding the interpreter
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the host. `RUST_LOG` takes precedence over the filter passed in.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber writing to stderr. Calling it again is a no-op.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
