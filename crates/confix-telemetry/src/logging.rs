//! Structured logging for Confix.
//!
//! Log output goes to stderr so that commands can keep stdout for their own
//! output. Two formats are supported: a human-readable one for terminals and
//! JSON for CI systems that ingest logs.
//!
//! # Example
//!
//! ```rust,ignore
//! use confix_telemetry::logging::{LogConfig, init_logging};
//!
//! let config = LogConfig::default();
//! init_logging(&config)?;
//!
//! tracing::info!(project = "api", components = 3, "Loaded components");
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

    /// Filter directive (e.g., "info", "confix=debug,confix_variables=trace").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to emit ANSI colors in the human-readable format.
    pub ansi: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: false,
            ansi: true,
            span_events: false,
            file_line_info: false,
            include_target: false,
        }
    }
}

/// Initializes the logging subsystem.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the level directive cannot be
/// parsed and `TelemetryError::LoggingInit` if a global subscriber is already
/// installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the directive is invalid.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}
