//! Structured logging setup for Keyforge
//!
//! Stdout is reserved for the response document the CLI prints, so every
//! subscriber built here writes to stderr.

use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize JSON logging
///
/// This sets up:
/// - JSON formatted logs on stderr
/// - `RUST_LOG` filtering, falling back to `default_level`
/// - Service name tagging
///
/// Calling it twice is harmless; the second subscriber is discarded.
pub fn init_logging(service_name: &str, default_level: &str) {
    let installed = tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true)
                .with_span_list(false),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(service = service_name, "Logging initialized");
    }
}

/// Initialize human-readable console logging on stderr
pub fn init_console_logging(service_name: &str, default_level: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(service = service_name, "Console logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_does_not_panic() {
        init_console_logging("keyforge-test", "warn");
        init_console_logging("keyforge-test", "warn");
        init_logging("keyforge-test", "warn");
    }
}
