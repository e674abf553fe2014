//! Variable error types.

use std::path::PathBuf;

use confix_core::ConfixError;
use thiserror::Error;

use crate::VariablePath;

/// Result type alias using [`VariableError`].
pub type VariableResult<T> = Result<T, VariableError>;

/// Errors raised while scanning, resolving or rewriting variable references.
#[derive(Error, Debug)]
pub enum VariableError {
    /// A provider has no value for a requested path.
    #[error("Variable '{path}' could not be resolved")]
    Unresolved {
        /// The requested reference.
        path: VariablePath,
    },

    /// A reference found in a document has no entry in the resolution map.
    #[error("Variable '{path}' was found in the document but has no resolved value")]
    MissingResolution {
        /// The reference without a value.
        path: VariablePath,
    },

    /// A reference names a provider that is not registered.
    #[error("Variable '{path}' names provider '{provider}', which is not registered")]
    UnknownProvider {
        /// The provider name from the reference.
        provider: String,
        /// The first reference naming the provider.
        path: VariablePath,
    },

    /// A string is not a valid variable reference.
    #[error("'{input}' is not a valid variable reference: {reason}")]
    InvalidPath {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A scan occurrence does not point at its reference in the document
    /// being rewritten.
    #[error("No variable reference at '{pointer}' in the document being rewritten")]
    StaleOccurrence {
        /// JSON pointer of the occurrence.
        pointer: String,
    },

    /// Resolution was cancelled before it completed.
    #[error("Variable resolution was cancelled")]
    Cancelled,

    /// A variable file could not be read.
    #[error("Failed to read variable file {}", .path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A variable file is not valid JSON.
    #[error("Variable file {} is not valid JSON", .path.display())]
    Json {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl VariableError {
    /// Create a new invalid path error.
    pub fn invalid_path(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns the reference this error is about, if there is one.
    #[must_use]
    pub const fn path(&self) -> Option<&VariablePath> {
        match self {
            Self::Unresolved { path }
            | Self::MissingResolution { path }
            | Self::UnknownProvider { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<VariableError> for ConfixError {
    fn from(err: VariableError) -> Self {
        match err {
            VariableError::Cancelled => ConfixError::Cancelled,
            VariableError::Unresolved { path } => {
                ConfixError::variable_resolution(path.to_string(), "no provider returned a value")
            }
            VariableError::MissingResolution { path } => ConfixError::variable_resolution(
                path.to_string(),
                "the resolver did not return a value",
            ),
            VariableError::UnknownProvider { provider, path } => ConfixError::variable_resolution(
                path.to_string(),
                format!("provider '{provider}' is not registered"),
            ),
            VariableError::InvalidPath { .. } => ConfixError::configuration(err.to_string()),
            VariableError::Io { path, source } => ConfixError::io(path, source),
            other => ConfixError::unhandled_with_source(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confix_core::ErrorCategory;

    fn path() -> VariablePath {
        VariablePath::new("shared", "db.password").unwrap()
    }

    #[test]
    fn test_unresolved_names_path() {
        let err = VariableError::Unresolved { path: path() };
        assert!(err.to_string().contains("${shared:db.password}"));
        assert_eq!(err.path(), Some(&path()));
    }

    #[test]
    fn test_cancelled_maps_to_cancellation() {
        let err: ConfixError = VariableError::Cancelled.into();
        assert!(err.is_cancellation());
    }

    #[test]
    fn test_resolution_errors_map_to_resolution_category() {
        let err: ConfixError = VariableError::MissingResolution { path: path() }.into();
        assert_eq!(err.category(), ErrorCategory::Resolution);
        assert!(err.to_string().contains("${shared:db.password}"));
    }

    #[test]
    fn test_unknown_provider_names_path() {
        let err: ConfixError = VariableError::UnknownProvider {
            provider: "vault".to_string(),
            path: VariablePath::new("vault", "db.password").unwrap(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Resolution);
        match err {
            ConfixError::VariableResolution { path, message } => {
                assert_eq!(path, "${vault:db.password}");
                assert!(message.contains("vault"));
            }
            other => panic!("expected VariableResolution, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_path_is_configuration() {
        let err: ConfixError = VariableError::invalid_path("${x}", "missing provider").into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
