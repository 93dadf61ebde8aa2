//! Tracing output for a process hosting a visual
//!
//! Events go to stderr, leaving stdout to the host channel. The engine reports
//! each value it falls back from at debug under `settings_core`, and rejected
//! settings definitions at warn under `settings_meta`, so
//! `RUST_LOG=settings_core=debug` traces every replaced value.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "info";

pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with(DEFAULT_DIRECTIVES)
}

/// Install the subscriber, with `directives` as the filter unless `RUST_LOG`
/// is set. Fails if a subscriber is already installed.
pub fn init_with(directives: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = filter_for(std::env::var(EnvFilter::DEFAULT_ENV).ok(), directives)?;
    let events = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(events)
        .try_init()?;
    Ok(())
}

fn filter_for(env: Option<String>, fallback: &str) -> Result<EnvFilter, ParseError> {
    match env.filter(|value| !value.trim().is_empty()) {
        Some(value) => EnvFilter::try_new(value),
        None => EnvFilter::try_new(fallback),
    }
}
