//! # Telemetry
//!
//! Tracing subscriber setup for hosts embedding the loader.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=pharmstock_core=trace` - Trace the engine only
//! - Otherwise: `[logging] filter` from the config

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Builds the filter: `RUST_LOG` first, then the configured directives.
pub fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter))
}

/// Installs a global fmt subscriber.
///
/// Returns false if a subscriber was already installed (e.g. by the host
/// application or an earlier call).
pub fn init_tracing(settings: &LoggingSettings) -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_filter(settings))
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        debug!(filter = %settings.filter, "Tracing initialized");
    }
    installed
}
