//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack for the core:
//! - pretty, compact or JSON output
//! - `RUST_LOG`-style module-level filtering
//! - secrets stay out of logs by construction (credentials have redacting
//!   `Debug` impls; flow entry points skip sensitive fields)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_filter("core_auth=debug,core_playback=debug");
//!
//! init_logging(config)?;
//! tracing::info!("Application started");
//! ```

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{CoreError, Result};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format for machine parsing
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default directive when `RUST_LOG` is unset (e.g., "info")
    pub default_directive: String,
    /// Custom filter string (e.g., "core_auth=debug,core_playback=trace")
    pub filter: Option<String>,
    /// Display target module in logs
    pub display_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_directive: "info".to_string(),
            filter: None,
            display_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_display_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let directives = match &self.filter {
            Some(filter) => filter.clone(),
            None => std::env::var("RUST_LOG").unwrap_or_else(|_| self.default_directive.clone()),
        };
        directives
            .parse::<EnvFilter>()
            .map_err(|e| CoreError::LoggingInit(format!("invalid filter '{}': {}", directives, e)))
    }
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns [`CoreError::LoggingInit`] when the filter cannot be parsed or a
/// global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(config.display_target))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(config.display_target))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(config.display_target))
            .try_init(),
    };

    result.map_err(|e| CoreError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.default_directive, "info");
        assert!(config.filter.is_none());
        assert!(config.display_target);
    }

    #[test]
    fn test_explicit_filter_wins() {
        let config = LoggingConfig::default().with_filter("core_auth=debug");
        let filter = config.env_filter().unwrap();
        assert!(filter.to_string().contains("core_auth"));
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = LoggingConfig::default().with_filter("===");
        assert!(matches!(
            config.env_filter(),
            Err(CoreError::LoggingInit(_))
        ));
    }

    #[test]
    fn test_builder_methods() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_default_directive("warn")
            .with_display_target(false);

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.default_directive, "warn");
        assert!(!config.display_target);
    }
}
