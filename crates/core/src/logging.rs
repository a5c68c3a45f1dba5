//! Structured logging infrastructure for HikePal.
//!
//! This module provides centralized logging initialization with support
//! for structured JSON output and environment-based configuration.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the logging system with human-readable output.
///
/// Log level can be configured via the `RUST_LOG` environment variable.
/// If not set, defaults to `info` level.
///
/// # Example
/// ```no_run
/// use hikepal_core::logging;
///
/// logging::init();
/// tracing::info!("Companion started");
/// ```
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Initialize the logging system with JSON output.
///
/// Suitable when the device ships logs off for later analysis.
///
/// # Example
/// ```no_run
/// use hikepal_core::logging;
///
/// logging::init_json();
/// tracing::info!(service = "hikepal-node", "Companion started");
/// ```
pub fn init_json() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true))
        .try_init();
}

/// Initialize logging in the format selected by configuration
pub fn init_with(json: bool) {
    if json {
        init_json();
    } else {
        init();
    }
}
