//! Configuration loading stages.

use std::path::{Path, PathBuf};

use confix_config::{ConfigLoader, ConfixConfig, DEFAULT_ENV_PREFIX};
use confix_core::{ConfixError, ConfixResult};
use confix_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};
use serde_json::Value;

use crate::features::{ConfigurationFeature, ConfigurationFile, ConfigurationFileFeature};

/// Configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "confix.toml";

enum Source {
    File(Option<PathBuf>),
    Preloaded(ConfixConfig),
}

/// Loads the project configuration into [`ConfigurationFeature`].
///
/// Without an explicit path, `confix.toml` in the working directory is used
/// when it exists. `CONFIX__SECTION__KEY` environment variables override
/// file values.
pub struct LoadConfigurationMiddleware {
    source: Source,
    env_prefix: Option<String>,
    dotenv: bool,
}

impl LoadConfigurationMiddleware {
    /// Loads from `path`, or from the default file.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            source: Source::File(path),
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
            dotenv: false,
        }
    }

    /// Uses an already loaded configuration.
    #[must_use]
    pub fn preloaded(config: ConfixConfig) -> Self {
        Self {
            source: Source::Preloaded(config),
            env_prefix: None,
            dotenv: false,
        }
    }

    /// Changes the environment override prefix. `None` disables overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: Option<&str>) -> Self {
        self.env_prefix = prefix.map(str::to_string);
        self
    }

    /// Reads a `.env` file before applying environment overrides.
    #[must_use]
    pub const fn with_dotenv(mut self, enabled: bool) -> Self {
        self.dotenv = enabled;
        self
    }

    fn load(&self) -> ConfixResult<ConfigurationFeature> {
        match &self.source {
            Source::Preloaded(config) => {
                config.validate()?;
                Ok(ConfigurationFeature {
                    config: config.clone(),
                    file: None,
                })
            }
            Source::File(path) => {
                let mut loader = ConfigLoader::new().with_defaults();
                if self.dotenv {
                    loader = loader.with_dotenv()?;
                }

                let file = match path {
                    Some(path) => {
                        loader = loader.with_file(path)?;
                        Some(path.clone())
                    }
                    None => {
                        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                        let found = default.exists();
                        loader = loader.with_optional_file(&default)?;
                        found.then_some(default)
                    }
                };

                if let Some(prefix) = &self.env_prefix {
                    loader = loader.with_env_prefix(prefix);
                }

                Ok(ConfigurationFeature {
                    config: loader.load()?,
                    file,
                })
            }
        }
    }
}

impl Middleware for LoadConfigurationMiddleware {
    fn name(&self) -> &'static str {
        "load_configuration"
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            ctx.set_status("Loading configuration...");
            let feature = self.load()?;
            if let Some(file) = &feature.file {
                tracing::debug!(file = %file.display(), "Loaded configuration");
            }
            ctx.features_mut().set(feature);
            next.run(ctx).await
        })
    }
}

/// Reads the project's configuration files into [`ConfigurationFileFeature`].
///
/// Files are resolved against the project directory and parsed as JSON, or
/// as TOML when the extension is `.toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadConfigurationFilesMiddleware;

impl ReadConfigurationFilesMiddleware {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for ReadConfigurationFilesMiddleware {
    fn name(&self) -> &'static str {
        "read_configuration_files"
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            let configuration = ctx.features().get::<ConfigurationFeature>()?;
            let declared = configuration.config.project.files.clone();
            let project = configuration.ensure_project()?;

            let mut files = Vec::with_capacity(declared.len());
            for relative in declared {
                ctx.ensure_not_cancelled()?;
                let path = project.directory.join(&relative);
                let content = read_document(&path).await?;
                files.push(ConfigurationFile {
                    path,
                    relative_path: relative,
                    content,
                });
            }

            tracing::debug!(count = files.len(), "Read configuration files");
            ctx.features_mut().set(ConfigurationFileFeature { files });
            next.run(ctx).await
        })
    }
}

async fn read_document(path: &Path) -> ConfixResult<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfixError::io(path, e))?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    if is_toml {
        let parsed: toml::Value = toml::from_str(&content).map_err(|e| {
            ConfixError::configuration(format!("{}: {e}", path.display()))
        })?;
        Ok(serde_json::to_value(parsed)?)
    } else {
        serde_json::from_str(&content)
            .map_err(|e| ConfixError::configuration(format!("{}: {e}", path.display())))
    }
}
