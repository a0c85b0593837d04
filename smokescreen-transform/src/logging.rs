//! Logging infrastructure for Smokescreen.
//!
//! The pipeline emits `tracing` events for transformer resolution, relation
//! loading, include expansion, serialization and composition. Nothing is
//! printed unless a subscriber is installed, either by the host application
//! or through [`init`] when the `tracing-subscriber` feature is enabled.
//!
//! # Environment Variables
//!
//! - `SMOKESCREEN_DEBUG=true` - Enable debug logging
//! - `SMOKESCREEN_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `SMOKESCREEN_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use smokescreen_transform::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//!
//! // Or with explicit settings
//! logging::init_with("debug", "pretty");
//! ```

use std::env;
use std::sync::Once;

use smokescreen_schema::config::DebugConfig;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `SMOKESCREEN_DEBUG`.
///
/// Returns `true` if it is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SMOKESCREEN_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `SMOKESCREEN_LOG_LEVEL`.
///
/// Defaults to "debug" if `SMOKESCREEN_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    env::var("SMOKESCREEN_LOG_LEVEL")
        .ok()
        .and_then(|level| normalize_level(&level))
        .unwrap_or(fallback)
}

/// Get the configured log format from `SMOKESCREEN_LOG_FORMAT`.
///
/// Defaults to "json" for structured logging.
pub fn get_log_format() -> &'static str {
    env::var("SMOKESCREEN_LOG_FORMAT")
        .map(|f| normalize_format(&f))
        .unwrap_or("json")
}

fn normalize_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn normalize_format(format: &str) -> &'static str {
    match format.to_lowercase().as_str() {
        "pretty" => "pretty",
        "compact" => "compact",
        _ => "json",
    }
}

/// Initialize logging from the environment.
///
/// Does nothing unless `SMOKESCREEN_DEBUG` or `SMOKESCREEN_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var("SMOKESCREEN_LOG_LEVEL").is_err() {
        return;
    }
    init_with(get_log_level(), get_log_format());
}

/// Initialize logging with a specific level, using the environment's format.
pub fn init_with_level(level: &str) {
    init_with(level, get_log_format());
}

/// Initialize debug-level logging.
pub fn init_debug() {
    init_with("debug", get_log_format());
}

/// Initialize logging from the `[debug]` section of the configuration.
///
/// Does nothing unless `enabled` is set.
pub fn init_from_config(config: &DebugConfig) {
    if config.enabled {
        init_with(&config.log_level, &config.log_format);
    }
}

/// Initialize logging with an explicit level and format.
///
/// Only the first initialization in a process takes effect.
pub fn init_with(level: &str, format: &str) {
    let level = normalize_level(level).unwrap_or("warn");
    let format = normalize_format(format);

    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "smokescreen={level},smokescreen_transform={level},smokescreen_schema={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format, "Smokescreen logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            // Without the subscriber feature the host application installs its own
            let _ = (level, format);
        }
    });
}

/// Macro for conditional debug logging.
///
/// Only logs if `SMOKESCREEN_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! smokescreen_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional trace logging.
#[macro_export]
macro_rules! smokescreen_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("DEBUG"), Some("debug"));
        assert_eq!(normalize_level("verbose"), None);
    }

    #[test]
    fn test_normalize_format() {
        assert_eq!(normalize_format("Pretty"), "pretty");
        assert_eq!(normalize_format("xml"), "json");
    }

    #[test]
    fn test_log_format_default() {
        // SAFETY: Test runs in isolation
        unsafe {
            env::remove_var("SMOKESCREEN_LOG_FORMAT");
        }
        assert_eq!(get_log_format(), "json");
    }
}
