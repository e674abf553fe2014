//! Features shared between the stages of the project pipelines.
//!
//! Each stage in [`crate::middlewares`] writes one of these into the run's
//! [`Features`](confix_middleware::Features); handlers read them back.

use std::path::PathBuf;
use std::sync::Arc;

use confix_config::ConfixConfig;
use confix_core::{ConfixResult, JsonSchemaDefinition, ProjectDefinition, SolutionDefinition};
use confix_variables::{VariableReplacer, VariableResolver};
use serde_json::Value;

use crate::components::ComponentProvider;

/// The loaded project configuration.
#[derive(Debug, Clone)]
pub struct ConfigurationFeature {
    /// The validated configuration.
    pub config: ConfixConfig,
    /// The file it was loaded from, if any.
    pub file: Option<PathBuf>,
}

impl ConfigurationFeature {
    /// Returns the configured project.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::Configuration` if no project is configured.
    pub fn ensure_project(&self) -> ConfixResult<ProjectDefinition> {
        Ok(self.config.ensure_project()?)
    }

    /// Returns the configured solution.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::Configuration` if no project is configured.
    pub fn ensure_solution(&self) -> ConfixResult<SolutionDefinition> {
        Ok(self.config.ensure_solution()?)
    }
}

/// A configuration file of the project, parsed into a document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Path relative to the project directory.
    pub relative_path: PathBuf,
    /// Parsed content.
    pub content: Value,
}

/// The project's configuration files.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationFileFeature {
    /// Files in declaration order.
    pub files: Vec<ConfigurationFile>,
}

/// The active environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFeature {
    /// Environment name.
    pub name: String,
}

/// Resolver for the variable providers active in the environment.
#[derive(Clone)]
pub struct VariableResolverFeature {
    /// The resolver.
    pub resolver: Arc<dyn VariableResolver>,
}

impl std::fmt::Debug for VariableResolverFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableResolverFeature").finish_non_exhaustive()
    }
}

/// Replacer sharing the resolver of [`VariableResolverFeature`].
#[derive(Debug, Clone)]
pub struct VariableReplacerFeature {
    /// The replacer.
    pub replacer: VariableReplacer,
}

/// Schemas collected during the run.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaFeature {
    /// Collected schema definitions.
    pub schemas: Vec<JsonSchemaDefinition>,
}

/// The component provider of the project.
#[derive(Clone)]
pub struct ComponentProviderExecutorFeature {
    /// Runs every registered component provider.
    pub executor: Arc<dyn ComponentProvider>,
}

impl std::fmt::Debug for ComponentProviderExecutorFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentProviderExecutorFeature")
            .field("executor", &self.executor.name())
            .finish()
    }
}

/// Files written by a project build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutputFeature {
    /// Written files, in the order their sources were declared.
    pub files: Vec<PathBuf>,
}
