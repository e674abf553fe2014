//! Error types for Confix.
//!
//! [`ConfixError`] is the single error type a pipeline run unwinds with.
//! Every failure belongs to exactly one [`ErrorCategory`], and the category
//! decides how the failure is surfaced:
//!
//! | Category | Meaning | Surfaced as |
//! |---|---|---|
//! | `Defect` | A stage ordering or wiring bug | diagnostic, non-zero exit |
//! | `Resolution` | A variable could not be resolved | diagnostic naming the path |
//! | `Cancellation` | The caller cancelled the run | silent |
//! | `Configuration` | Invalid project or solution setup | diagnostic |
//! | `Io` | A file could not be read or written | diagnostic |
//! | `Unhandled` | Anything else | full diagnostic chain |
//!
//! There is no local recovery or retry anywhere in the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ConfixError`].
pub type ConfixResult<T> = Result<T, ConfixError>;

/// Categories of errors for classification and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Programming or stage-ordering defect. Never retried.
    Defect,
    /// A variable reference could not be resolved.
    Resolution,
    /// Cooperative cancellation requested by the caller.
    Cancellation,
    /// The project or solution configuration is invalid.
    Configuration,
    /// Filesystem failure.
    Io,
    /// Any other failure.
    Unhandled,
}

impl ErrorCategory {
    /// Returns `true` if failures of this category should be reported with
    /// diagnostics.
    #[must_use]
    pub const fn is_diagnostic(self) -> bool {
        !matches!(self, Self::Cancellation)
    }
}

/// Standard error type for Confix pipelines.
///
/// # Example
///
/// ```
/// use confix_core::{ConfixError, ErrorCategory};
///
/// let error = ConfixError::missing_feature("ConfigurationFeature");
/// assert_eq!(error.category(), ErrorCategory::Defect);
/// assert!(!error.is_cancellation());
/// ```
#[derive(Error, Debug)]
pub enum ConfixError {
    /// A stage or handler read a feature no earlier stage populated.
    #[error("Feature '{feature}' is not available. A preceding stage must set it.")]
    MissingFeature {
        /// Type name of the missing feature.
        feature: String,
    },

    /// A variable reference could not be resolved.
    #[error("Could not resolve variable '{path}': {message}")]
    VariableResolution {
        /// The formatted variable reference.
        path: String,
        /// Why resolution failed.
        message: String,
    },

    /// The run was cancelled.
    #[error("Operation was cancelled")]
    Cancelled,

    /// The project or solution configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// A file could not be read or written.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A run context was executed more than once.
    #[error("A run context can only be executed once; create a new context for every run")]
    ContextReused,

    /// Any other failure.
    #[error("{message}")]
    Unhandled {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ConfixError {
    /// Creates a missing feature error.
    #[must_use]
    pub fn missing_feature(feature: impl Into<String>) -> Self {
        Self::MissingFeature {
            feature: feature.into(),
        }
    }

    /// Creates a variable resolution error.
    #[must_use]
    pub fn variable_resolution(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VariableResolution {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error for a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an unhandled error.
    #[must_use]
    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::Unhandled {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unhandled error with a source error.
    pub fn unhandled_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Unhandled {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingFeature { .. } | Self::ContextReused => ErrorCategory::Defect,
            Self::VariableResolution { .. } => ErrorCategory::Resolution,
            Self::Cancelled => ErrorCategory::Cancellation,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Io { .. } => ErrorCategory::Io,
            Self::Unhandled { .. } => ErrorCategory::Unhandled,
        }
    }

    /// Returns `true` if this error is a cooperative cancellation.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Renders the error and its full source chain, one cause per line.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

impl From<serde_json::Error> for ConfixError {
    fn from(error: serde_json::Error) -> Self {
        Self::unhandled_with_source("invalid JSON document", error)
    }
}

impl From<anyhow::Error> for ConfixError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unhandled {
            message: error.to_string(),
            source: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_feature() {
        let error = ConfixError::missing_feature("JsonSchemaFeature");
        assert_eq!(error.category(), ErrorCategory::Defect);
        assert!(error.to_string().contains("JsonSchemaFeature"));
    }

    #[test]
    fn test_variable_resolution_names_path() {
        let error = ConfixError::variable_resolution("${shared:db.password}", "not found");
        assert_eq!(error.category(), ErrorCategory::Resolution);
        assert!(error.to_string().contains("${shared:db.password}"));
    }

    #[test]
    fn test_cancellation_is_distinct() {
        let error = ConfixError::Cancelled;
        assert!(error.is_cancellation());
        assert!(!error.category().is_diagnostic());

        for other in [
            ConfixError::missing_feature("x"),
            ConfixError::configuration("x"),
            ConfixError::unhandled("x"),
            ConfixError::ContextReused,
        ] {
            assert!(!other.is_cancellation());
            assert!(other.category().is_diagnostic());
        }
    }

    #[test]
    fn test_diagnostic_includes_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = ConfixError::unhandled_with_source("failed to store schema", io);
        let diagnostic = error.diagnostic();
        assert!(diagnostic.starts_with("failed to store schema"));
        assert!(diagnostic.contains("caused by: no such file"));
    }

    #[test]
    fn test_io_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ConfixError::io("/tmp/schema.json", io);
        assert_eq!(error.category(), ErrorCategory::Io);
        assert!(error.to_string().contains("/tmp/schema.json"));
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ErrorCategory::Cancellation).unwrap();
        assert_eq!(json, "\"cancellation\"");
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: ConfixError = parse_error.into();
        assert_eq!(error.category(), ErrorCategory::Unhandled);
    }
}
