//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfixConfig, LogFormat};

/// Default prefix for environment variable overrides.
pub const DEFAULT_ENV_PREFIX: &str = "CONFIX";

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use confix_config::ConfigLoader;
///
/// # fn main() -> Result<(), confix_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("confix.toml")?
///     .with_env_prefix("CONFIX")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ConfixConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to default configuration values.
    ///
    /// This is what `new()` starts from, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        let base_dir = self.config.base_dir.take();
        self.config = ConfixConfig {
            base_dir,
            ..ConfixConfig::default()
        };
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats. The file's directory
    /// becomes the base directory relative paths are resolved against.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let mut file_config = Self::parse_file(&content, path)?;
        file_config.base_dir = Some(base_dir_of(path));
        self.config = file_config;

        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Arguments
    ///
    /// * `content` - Configuration content as a string
    /// * `format` - File format ("toml" or "json")
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use confix_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [project]
    ///     name = "api"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.project.name.as_deref(), Some("api"));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let base_dir = self.config.base_dir.take();
        let mut parsed: ConfixConfig = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        parsed.base_dir = base_dir;
        self.config = parsed;
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "CONFIX":
    /// - `CONFIX__PROJECT__NAME=api`
    /// - `CONFIX__ENVIRONMENT__NAME=production`
    /// - `CONFIX__LOGGING__FORMAT=json`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or one of its parents,
    /// if there is one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotEnv` if a `.env` file was found but could not
    /// be read or parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        ignore_missing(dotenvy::dotenv())?;
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Environment variable parsing fails
    /// - Configuration validation fails
    pub fn load(mut self) -> Result<ConfixConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> ConfixConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<ConfixConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut overrides: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(&marker))
            .collect();
        overrides.sort();

        for (key, value) in overrides {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["PROJECT", "NAME"] => {
                self.config.project.name = non_empty(value);
            }
            ["PROJECT", "DIRECTORY"] => {
                self.config.project.directory = non_empty(value).map(PathBuf::from);
            }
            ["PROJECT", "OUTPUT_DIR"] => {
                self.config.project.output_dir = PathBuf::from(value);
            }

            ["SOLUTION", "DIRECTORY"] => {
                self.config.solution.directory = non_empty(value).map(PathBuf::from);
            }

            ["ENVIRONMENT", "NAME"] => {
                self.config.environment.name = value.to_string();
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => {
                self.config.logging.ansi_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // unknown keys are ignored
            _ => {}
        }

        Ok(())
    }
}

/// Treats a missing `.env` file as success.
fn ignore_missing<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

fn base_dir_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.environment.name, "development");
        assert!(config.base_dir.is_none());
    }

    #[test]
    fn test_loader_with_defaults_resets_sections() {
        let config = ConfigLoader::new()
            .with_string("[environment]\nname = \"staging\"", "toml")
            .unwrap()
            .with_defaults()
            .load()
            .unwrap();
        assert_eq!(config.environment.name, "development");
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            [project]
            name = "api"
            files = ["appsettings.json"]

            [environment]
            name = "staging"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.project.name.as_deref(), Some("api"));
        assert_eq!(config.project.files, vec![PathBuf::from("appsettings.json")]);
        assert_eq!(config.environment.name, "staging");
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"project": {"name": "api"}, "logging": {"format": "json"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_unsupported_format() {
        let result = ConfigLoader::new().with_string("name: api", "yaml");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_unknown_field_rejected() {
        let result = ConfigLoader::new().with_string("[server]\nport = 1", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/confix.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/confix.toml")
            .unwrap()
            .load()
            .unwrap();

        assert!(config.project.name.is_none());
    }

    #[test]
    fn test_loader_with_file_sets_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confix.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[project]\nname = \"api\"").unwrap();

        let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();

        assert_eq!(config.base_dir.as_deref(), Some(dir.path()));
        let project = config.ensure_project().unwrap();
        assert_eq!(project.directory, dir.path());
    }

    #[test]
    fn test_loader_validation_runs_on_load() {
        let toml = r#"
            [[variables.providers]]
            name = "bad name"
        "#;

        let result = ConfigLoader::new().with_string(toml, "toml").unwrap().load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));

        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));

        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    // Overrides are applied through apply_env_var directly; setting process
    // environment variables needs unsafe, which the workspace forbids.

    #[test]
    fn test_apply_env_var_project() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__PROJECT__NAME", "worker", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__PROJECT__OUTPUT_DIR", "dist", "TEST")
            .unwrap();
        assert_eq!(loader.config.project.name.as_deref(), Some("worker"));
        assert_eq!(loader.config.project.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_apply_env_var_environment() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__ENVIRONMENT__NAME", "production", "TEST")
            .unwrap();
        assert_eq!(loader.config.environment.name, "production");
    }

    #[test]
    fn test_apply_env_var_empty_clears_solution() {
        let mut loader = ConfigLoader::new().with_string(
            "[solution]\ndirectory = \"..\"",
            "toml",
        ).unwrap();
        loader
            .apply_env_var("TEST__SOLUTION__DIRECTORY", "", "TEST")
            .unwrap();
        assert!(loader.config.solution.directory.is_none());
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__LOGGING__FORMAT", "json", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__LOGGING__ENABLED", "no", "TEST")
            .unwrap();
        assert_eq!(loader.config.logging.format, LogFormat::Json);
        assert!(!loader.config.logging.enabled);
    }

    #[test]
    fn test_apply_env_var_invalid_boolean() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("TEST__LOGGING__ANSI_ENABLED", "sometimes", "TEST");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__SERVER__PORT", "8080", "TEST")
            .is_ok());
    }

    #[test]
    fn test_complete_toml_config() {
        let toml = r#"
            [project]
            name = "api"
            directory = "src/api"
            files = ["appsettings.json", "appsettings.Development.json"]
            output_dir = "out"

            [solution]
            directory = "."

            [environment]
            name = "production"

            [[components]]
            provider = "shared"
            name = "Database"
            schema = { type = "object", properties = { connectionString = { type = "string" } } }

            [[variables.providers]]
            name = "shared"
            type = "local"
            values = { db = { password = "secret" } }

            [[variables.providers]]
            name = "prod"
            file = "prod-variables.json"
            environments = ["production"]

            [logging]
            level = "confix=debug"
            format = "pretty"
            ansi_enabled = false
        "#;

        let mut config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();
        config.base_dir = Some(PathBuf::from("/repo"));

        assert_eq!(config.project.files.len(), 2);
        assert_eq!(config.components[0].name, "Database");
        assert_eq!(config.components[0].schema["type"], "object");
        assert_eq!(config.variables.providers.len(), 2);
        assert_eq!(config.active_providers().count(), 2);
        assert!(!config.logging.ansi_enabled);

        let project = config.ensure_project().unwrap();
        assert_eq!(project.directory, PathBuf::from("/repo/src/api"));
        let solution = config.ensure_solution().unwrap();
        assert_eq!(solution.directory, PathBuf::from("/repo/."));
    }

    #[test]
    fn test_dotenv_missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ignore_missing(dotenvy::from_path(dir.path().join(".env"))).is_ok());
    }

    #[test]
    fn test_dotenv_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "CONFIX_DOTENV_MALFORMED VALUE\n").unwrap();

        let err = ignore_missing(dotenvy::from_path(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::DotEnv(_)));

        let err: confix_core::ConfixError = err.into();
        assert_eq!(err.category(), confix_core::ErrorCategory::Configuration);
    }
}
