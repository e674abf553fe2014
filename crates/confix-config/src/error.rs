//! Configuration error types.

use std::path::PathBuf;

use confix_core::ConfixError;
use thiserror::Error;

/// Errors that can occur while loading or interpreting project configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {}", .path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {}", .path.display())]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// The field with the invalid value.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// Missing required field.
    #[error("missing required configuration field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },

    /// A `.env` file exists but could not be loaded.
    #[error("failed to load .env file: {0}")]
    DotEnv(#[source] dotenvy::Error),

    /// Validation error after loading.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a new environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<ConfigError> for ConfixError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ReadError { path, source } => ConfixError::io(path, source),
            other => ConfixError::configuration(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confix_core::ErrorCategory;

    #[test]
    fn test_file_not_found_error() {
        let err = ConfigError::file_not_found("/repo/confix.toml");
        assert!(err.to_string().contains("/repo/confix.toml"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value("logging.level", "unknown level");
        assert!(err.to_string().contains("logging.level"));
        assert!(err.to_string().contains("unknown level"));
    }

    #[test]
    fn test_missing_field_error() {
        let err = ConfigError::missing_field("project.name");
        assert_eq!(
            err.to_string(),
            "missing required configuration field: project.name"
        );
    }

    #[test]
    fn test_env_parse_error() {
        let err = ConfigError::env_parse_error("CONFIX__LOGGING__ENABLED", "expected boolean");
        assert!(err.to_string().contains("CONFIX__LOGGING__ENABLED"));
        assert!(err.to_string().contains("expected boolean"));
    }

    #[test]
    fn test_into_confix_error() {
        let err: ConfixError = ConfigError::missing_field("project.name").into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("project.name"));
    }

    #[test]
    fn test_read_error_maps_to_io() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConfixError = ConfigError::read_error("/repo/confix.toml", source).into();
        assert_eq!(err.category(), ErrorCategory::Io);
    }
}
