//! Tracing setup for the binary.
//!
//! `RUST_LOG` wins when set, e.g. `RUST_LOG=dualedit::sync=debug`;
//! otherwise the configured default filter applies. Output goes to stderr
//! so stdout stays clean for the markup.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt};

pub fn init(default_filter: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).try_init()
}
