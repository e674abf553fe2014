//! Project pipelines.
//!
//! ```text
//! reload: LoadConfiguration → ReadConfigurationFiles → Environment → Variables
//!         → JsonSchemaCollection → BuildComponentProvider → compose + store
//!
//! build:  LoadConfiguration → ReadConfigurationFiles → Environment → Variables
//!         → rewrite + write
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use confix_config::ConfixConfig;
use confix_middleware::{PipelineBuilder, TimingMiddleware};
use confix_variables::VariableResolver;

use crate::components::ComponentProvider;
use crate::middlewares::{
    EnvironmentMiddleware, LoadConfigurationMiddleware, ReadConfigurationFilesMiddleware,
    VariableMiddleware,
};

mod project_build;
mod project_reload;

pub use project_build::{ProjectBuildHandler, ProjectBuildPipeline};
pub use project_reload::{ProjectReloadHandler, ProjectReloadPipeline};

/// Inputs shared by the project pipelines.
#[derive(Clone, Default)]
pub struct PipelineOptions {
    /// Configuration file. Defaults to `confix.toml` in the working directory.
    pub config_path: Option<PathBuf>,
    /// Configuration to use instead of loading a file.
    pub config: Option<ConfixConfig>,
    /// Environment overriding the configured one.
    pub environment: Option<String>,
    /// Read `.env` before applying environment overrides.
    pub dotenv: bool,
    /// Resolver replacing the configured variable providers.
    pub resolver: Option<Arc<dyn VariableResolver>>,
    /// Component providers run after the configured components.
    pub component_providers: Vec<Arc<dyn ComponentProvider>>,
}

impl std::fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("config_path", &self.config_path)
            .field("environment", &self.environment)
            .field("dotenv", &self.dotenv)
            .finish_non_exhaustive()
    }
}

impl PipelineOptions {
    /// Loads configuration from `path`.
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Uses an already loaded configuration.
    #[must_use]
    pub fn from_config(config: ConfixConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::default()
        }
    }

    /// Overrides the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment;
        self
    }

    /// Enables `.env` loading.
    #[must_use]
    pub const fn with_dotenv(mut self, enabled: bool) -> Self {
        self.dotenv = enabled;
        self
    }

    /// Replaces the configured variable providers.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn VariableResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Adds a component provider.
    #[must_use]
    pub fn with_component_provider(mut self, provider: Arc<dyn ComponentProvider>) -> Self {
        self.component_providers.push(provider);
        self
    }
}

/// Stages every project pipeline starts with.
fn common_stages(name: &'static str, options: &PipelineOptions) -> PipelineBuilder {
    let load = match &options.config {
        Some(config) => LoadConfigurationMiddleware::preloaded(config.clone()),
        None => LoadConfigurationMiddleware::new(options.config_path.clone())
            .with_dotenv(options.dotenv),
    };

    let variables = match &options.resolver {
        Some(resolver) => VariableMiddleware::new().with_resolver(resolver.clone()),
        None => VariableMiddleware::new(),
    };

    PipelineBuilder::named(name)
        .use_middleware(TimingMiddleware::new())
        .use_middleware(load)
        .use_middleware(ReadConfigurationFilesMiddleware::new())
        .use_middleware(EnvironmentMiddleware::new().with_override(options.environment.clone()))
        .use_middleware(variables)
}
