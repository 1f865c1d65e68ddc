//! Observability
//!
//! The library emits `tracing` events tagged with an `event` name from
//! [`Event`]; installing a subscriber is left to the binary.

mod events;

pub use events::Event;

use tracing_subscriber::EnvFilter;

/// Log level names accepted by `init_logging` and the config file.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Installs a stderr `fmt` subscriber.
///
/// Precedence: `explicit`, then `RUST_LOG`, then `fallback`. Calling this
/// twice is harmless: the second install is ignored.
pub fn init_logging(explicit: Option<&str>, fallback: &str) {
    let filter = match explicit {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn is_known_level(level: &str) -> bool {
    LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
}
