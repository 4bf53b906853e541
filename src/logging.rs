//! Diagnostic logging for the command line tool
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary.

use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Variable read before `RUST_LOG`
pub const LOG_ENV: &str = "HILITE_LOG";

/// Filter used when neither variable is set
pub const DEFAULT_FILTER: &str = "hilite=warn";

/// Filter from `HILITE_LOG`, then `RUST_LOG`, then the default
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr subscriber. Returns false if one was already set.
pub fn init() -> bool {
    let subscriber = tracing_subscriber::registry().with(env_filter()).with(
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(false)
            .with_target(true),
    );

    if subscriber.try_init().is_err() {
        return false;
    }

    tracing::debug!("tracing initialized");
    true
}
