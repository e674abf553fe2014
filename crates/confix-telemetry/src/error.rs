//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The log filter directive could not be parsed.
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },
}
