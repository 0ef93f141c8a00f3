//! Structured logging for Talaria.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and one fmt
//! layer: JSON lines in production, pretty multi-line output in development.
//!
//! # Example
//!
//! ```rust,ignore
//! use talaria_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().with_level("talaria=debug,info"))?;
//!
//! tracing::info!(http.method = "GET", http.path = "/ping", "serving");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. `"info"` or `"talaria::dispatch=debug,warn"`).
    pub level: String,

    /// Whether `RUST_LOG` takes precedence over `level` when set.
    pub respect_env: bool,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include the target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            respect_env: true,
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            respect_env: true,
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
        }
    }

    /// Creates a configuration that installs nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::production()
        }
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Builds the filter this configuration selects.
    ///
    /// `RUST_LOG` wins when `respect_env` is set and the variable parses;
    /// otherwise `level` is used.
    pub fn filter(&self) -> TelemetryResult<EnvFilter> {
        if self.respect_env {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
        }
        create_env_filter(&self.level)
    }
}

/// Initializes the logging subsystem.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the filter does not parse and
/// `TelemetryError::LoggingInit` if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = config.filter()?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(json = config.json_format, level = %config.level, "logging initialized");
    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidFilter(format!("{filter}: {e}")))
}

/// Standard log field names.
///
/// The dispatcher's exception records use exactly these names.
pub mod fields {
    /// Target of every record emitted by the dispatcher.
    pub const DISPATCH_TARGET: &str = "talaria::dispatch";

    /// HTTP method field name.
    pub const HTTP_METHOD: &str = "http.method";

    /// HTTP path field name.
    pub const HTTP_PATH: &str = "http.path";

    /// HTTP status code field name.
    pub const HTTP_STATUS: &str = "http.status_code";

    /// Error taxonomy member field name.
    pub const ERROR_KIND: &str = "error.kind";

    /// Client-facing error description field name.
    pub const ERROR_MESSAGE: &str = "error.message";

    /// Underlying fault field name.
    pub const ERROR_SOURCE: &str = "error.source";

    /// Negotiated media type field name.
    pub const MIMETYPE: &str = "mimetype";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_production() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert!(!config.span_events);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_with_level() {
        let config = LogConfig::production().with_level("talaria::dispatch=debug,warn");
        assert_eq!(config.level, "talaria::dispatch=debug,warn");
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("talaria::dispatch=debug,warn").is_ok());
        assert!(matches!(
            create_env_filter("talaria=loud"),
            Err(TelemetryError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_filter_ignores_env_when_asked() {
        let config = LogConfig {
            respect_env: false,
            ..LogConfig::production().with_level("talaria=loud")
        };
        assert!(config.filter().is_err());
    }

    #[test]
    fn test_disabled_logging() {
        assert!(init_logging(&LogConfig::disabled()).is_ok());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(fields::DISPATCH_TARGET, "talaria::dispatch");
        assert_eq!(fields::HTTP_STATUS, "http.status_code");
        assert_eq!(fields::ERROR_KIND, "error.kind");
    }
}
