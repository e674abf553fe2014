//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project section.
///
/// # Example
///
/// ```
/// use confix_config::ProjectConfig;
///
/// let config = ProjectConfig {
///     name: Some("api".to_string()),
///     files: vec!["appsettings.json".into()],
///     ..Default::default()
/// };
/// assert_eq!(config.output_dir, std::path::PathBuf::from(".confix/build"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name. Required by every project pipeline.
    #[serde(default)]
    pub name: Option<String>,

    /// Project directory. Relative paths resolve against the configuration
    /// file's directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Configuration files of the project, relative to the project directory.
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Where materialized configuration files are written, relative to the
    /// project directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            directory: None,
            files: Vec::new(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".confix/build")
}

/// Solution section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SolutionConfig {
    /// Solution root. Defaults to the project directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Environment section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Name of the active environment.
    #[serde(default = "default_environment")]
    pub name: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: default_environment(),
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}

/// A component declared directly in the project configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    /// Provider name the component is reported under.
    #[serde(default = "default_component_provider")]
    pub provider: String,

    /// Component name.
    pub name: String,

    /// JSON schema of the component.
    #[serde(default = "empty_object")]
    pub schema: serde_json::Value,
}

fn default_component_provider() -> String {
    "inline".to_string()
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Kind of a variable provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariableProviderKind {
    /// Values from an inline table or a local JSON file.
    #[default]
    Local,
}

/// A variable provider declaration.
///
/// ```toml
/// [[variables.providers]]
/// name = "shared"
/// type = "local"
/// file = "variables.json"
/// environments = ["development", "staging"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VariableProviderConfig {
    /// Provider name, the `provider` part of `${provider:key}`.
    pub name: String,

    /// Provider kind.
    #[serde(default, rename = "type")]
    pub kind: VariableProviderKind,

    /// Inline values.
    #[serde(default)]
    pub values: Option<serde_json::Value>,

    /// JSON file with values, relative to the configuration file.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Environments in which the provider is active. Empty means all.
    #[serde(default)]
    pub environments: Vec<String>,
}

impl VariableProviderConfig {
    /// Returns `true` if the provider is active in `environment`.
    #[must_use]
    pub fn is_active_in(&self, environment: &str) -> bool {
        self.environments.is_empty() || self.environments.iter().any(|e| e == environment)
    }
}

/// Variables section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VariablesConfig {
    /// Declared providers.
    #[serde(default)]
    pub providers: Vec<VariableProviderConfig>,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// JSON formatted logs.
    Json,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default = "default_true")]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the telemetry crate's logging settings.
    #[must_use]
    pub fn to_log_config(&self) -> confix_telemetry::LogConfig {
        confix_telemetry::LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            ansi: self.ansi_enabled,
            span_events: false,
            file_line_info: self.include_location,
            include_target: self.include_location,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_deserializes_from_type() {
        let provider: VariableProviderConfig =
            serde_json::from_str(r#"{"name": "shared", "type": "local"}"#).unwrap();
        assert_eq!(provider.kind, VariableProviderKind::Local);
        assert!(provider.values.is_none());
    }

    #[test]
    fn test_provider_active_environments() {
        let mut provider: VariableProviderConfig =
            serde_json::from_str(r#"{"name": "shared"}"#).unwrap();
        assert!(provider.is_active_in("production"));

        provider.environments = vec!["development".to_string()];
        assert!(provider.is_active_in("development"));
        assert!(!provider.is_active_in("production"));
    }

    #[test]
    fn test_component_defaults() {
        let component: ComponentConfig =
            serde_json::from_str(r#"{"name": "Database"}"#).unwrap();
        assert_eq!(component.provider, "inline");
        assert!(component.schema.is_object());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<ProjectConfig>(r#"{"nmae": "typo"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_to_log_config() {
        let logging = LoggingConfig {
            format: LogFormat::Json,
            level: "debug".to_string(),
            ..Default::default()
        };
        let log_config = logging.to_log_config();
        assert!(log_config.json_format);
        assert_eq!(log_config.level, "debug");
    }
}
