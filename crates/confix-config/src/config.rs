//! Main configuration types.
//!
//! This module provides the top-level [`ConfixConfig`] struct and its builder.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use confix_core::{ProjectDefinition, SolutionDefinition};
use serde::{Deserialize, Serialize};

use crate::{
    ComponentConfig, ConfigError, EnvironmentConfig, LoggingConfig, ProjectConfig,
    SolutionConfig, VariableProviderConfig, VariablesConfig,
};

/// Complete Confix project configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use confix_config::ConfixConfig;
///
/// let config = ConfixConfig::default();
/// assert_eq!(config.environment.name, "development");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfixConfig {
    /// Project configuration.
    #[serde(default)]
    pub project: ProjectConfig,

    /// Solution configuration.
    #[serde(default)]
    pub solution: SolutionConfig,

    /// Active environment.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Components declared inline.
    #[serde(default)]
    pub components: Vec<ComponentConfig>,

    /// Variable providers.
    #[serde(default)]
    pub variables: VariablesConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory relative paths are resolved against. Set by the loader to
    /// the directory of the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ConfixConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use confix_config::ConfixConfig;
    ///
    /// let config = ConfixConfig::builder()
    ///     .project_name("api")
    ///     .base_dir("/repo/src/api")
    ///     .build();
    ///
    /// assert_eq!(config.project.name.as_deref(), Some("api"));
    /// ```
    #[must_use]
    pub fn builder() -> ConfixConfigBuilder {
        ConfixConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The project name is empty, contains a path separator, or is `.` or
    ///   `..`
    /// - A variable provider name is empty, contains characters outside
    ///   `[A-Za-z0-9_-]`, or is declared twice
    /// - A provider declares both inline `values` and a `file`
    /// - A component name is empty or declared twice for the same provider
    /// - The log filter cannot be parsed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.project.name {
            if !is_file_stem(name) {
                return Err(ConfigError::invalid_value(
                    "project.name",
                    format!("'{name}' must be non-empty and usable as a file name"),
                ));
            }
        }

        let mut provider_names = HashSet::new();
        for provider in &self.variables.providers {
            if !is_identifier(&provider.name) {
                return Err(ConfigError::invalid_value(
                    "variables.providers.name",
                    format!(
                        "'{}' must be non-empty and only contain letters, digits, '_' or '-'",
                        provider.name
                    ),
                ));
            }
            if !provider_names.insert(provider.name.as_str()) {
                return Err(ConfigError::validation_error(format!(
                    "variable provider '{}' is declared more than once",
                    provider.name
                )));
            }
            if provider.values.is_some() && provider.file.is_some() {
                return Err(ConfigError::validation_error(format!(
                    "variable provider '{}' declares both 'values' and 'file'",
                    provider.name
                )));
            }
        }

        let mut component_names = HashSet::new();
        for component in &self.components {
            if component.name.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "components.name",
                    "component name must not be empty",
                ));
            }
            if !component_names.insert((component.provider.as_str(), component.name.as_str())) {
                return Err(ConfigError::validation_error(format!(
                    "component '@{}/{}' is declared more than once",
                    component.provider, component.name
                )));
            }
        }

        confix_telemetry::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }

    /// Resolves a path against [`base_dir`](Self::base_dir).
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.base_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Returns the project definition.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if no project name is configured.
    pub fn ensure_project(&self) -> Result<ProjectDefinition, ConfigError> {
        let name = self
            .project
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ConfigError::missing_field("project.name"))?;

        let directory = match &self.project.directory {
            Some(directory) => self.resolve_path(directory),
            None => self.base_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        };

        Ok(ProjectDefinition::new(name, directory))
    }

    /// Returns the solution definition. Defaults to the project directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the project itself is not configured.
    pub fn ensure_solution(&self) -> Result<SolutionDefinition, ConfigError> {
        let directory = match &self.solution.directory {
            Some(directory) => self.resolve_path(directory),
            None => self.ensure_project()?.directory,
        };
        Ok(SolutionDefinition::new(directory))
    }

    /// Returns the variable providers active in the configured environment.
    pub fn active_providers(&self) -> impl Iterator<Item = &VariableProviderConfig> {
        self.variables
            .providers
            .iter()
            .filter(|p| p.is_active_in(&self.environment.name))
    }
}

/// Project names become schema file names and must stay inside their
/// directory.
fn is_file_stem(value: &str) -> bool {
    !value.trim().is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0'])
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Builder for [`ConfixConfig`].
#[derive(Debug, Default)]
pub struct ConfixConfigBuilder {
    config: ConfixConfig,
}

impl ConfixConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the project name.
    #[must_use]
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.config.project.name = Some(name.into());
        self
    }

    /// Set the project section.
    #[must_use]
    pub fn project(mut self, project: ProjectConfig) -> Self {
        self.config.project = project;
        self
    }

    /// Set the solution directory.
    #[must_use]
    pub fn solution_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.solution.directory = Some(directory.into());
        self
    }

    /// Set the active environment.
    #[must_use]
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.config.environment.name = name.into();
        self
    }

    /// Add an inline component.
    #[must_use]
    pub fn component(mut self, component: ComponentConfig) -> Self {
        self.config.components.push(component);
        self
    }

    /// Add a variable provider.
    #[must_use]
    pub fn variable_provider(mut self, provider: VariableProviderConfig) -> Self {
        self.config.variables.providers.push(provider);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Set the base directory for relative paths.
    #[must_use]
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = Some(base_dir.into());
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ConfixConfig {
        self.config
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<ConfixConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
