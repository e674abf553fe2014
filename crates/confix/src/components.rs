//! Component providers.
//!
//! A component provider discovers the components of a project and the schema
//! each one contributes. The reload pipeline runs every registered provider
//! through one [`ComponentProviderExecutor`].

use std::sync::Arc;

use confix_config::ComponentConfig;
use confix_core::{Component, ConfixError, ConfixResult, ProjectDefinition, SolutionDefinition};
use confix_middleware::{BoxFuture, RunLogger};
use tokio_util::sync::CancellationToken;

/// State handed to component providers.
///
/// Providers append what they find to [`components`](Self::components).
#[derive(Debug)]
pub struct ComponentProviderContext {
    logger: RunLogger,
    cancellation: CancellationToken,
    project: ProjectDefinition,
    solution: SolutionDefinition,
    /// Components discovered so far.
    pub components: Vec<Component>,
}

impl ComponentProviderContext {
    /// Creates an empty provider context.
    #[must_use]
    pub fn new(
        logger: RunLogger,
        cancellation: CancellationToken,
        project: ProjectDefinition,
        solution: SolutionDefinition,
    ) -> Self {
        Self {
            logger,
            cancellation,
            project,
            solution,
            components: Vec::new(),
        }
    }

    /// The run logger.
    #[must_use]
    pub const fn logger(&self) -> &RunLogger {
        &self.logger
    }

    /// The run's cancellation token.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The project being loaded.
    #[must_use]
    pub const fn project(&self) -> &ProjectDefinition {
        &self.project
    }

    /// The solution the project belongs to.
    #[must_use]
    pub const fn solution(&self) -> &SolutionDefinition {
        &self.solution
    }
}

/// Discovers components of a project.
pub trait ComponentProvider: Send + Sync {
    /// Provider name, used in logs.
    fn name(&self) -> &'static str;

    /// Appends the provider's components to `ctx.components`.
    fn execute<'a>(
        &'a self,
        ctx: &'a mut ComponentProviderContext,
    ) -> BoxFuture<'a, ConfixResult<()>>;
}

/// Components declared in the `[[components]]` section of the configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredComponentProvider {
    components: Vec<ComponentConfig>,
}

impl ConfiguredComponentProvider {
    /// Creates a provider returning `components`.
    #[must_use]
    pub fn new(components: Vec<ComponentConfig>) -> Self {
        Self { components }
    }
}

impl ComponentProvider for ConfiguredComponentProvider {
    fn name(&self) -> &'static str {
        "configured"
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a mut ComponentProviderContext,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            ctx.components.extend(self.components.iter().map(|c| {
                Component::new(c.provider.clone(), c.name.clone(), c.schema.clone())
            }));
            Ok(())
        })
    }
}

/// Runs a list of providers in order against one context.
#[derive(Clone, Default)]
pub struct ComponentProviderExecutor {
    providers: Vec<Arc<dyn ComponentProvider>>,
}

impl ComponentProviderExecutor {
    /// Creates an executor without providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ComponentProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` if no provider is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ComponentProviderExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}

impl ComponentProvider for ComponentProviderExecutor {
    fn name(&self) -> &'static str {
        "executor"
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a mut ComponentProviderContext,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            for provider in &self.providers {
                if ctx.cancellation().is_cancelled() {
                    return Err(ConfixError::Cancelled);
                }
                let before = ctx.components.len();
                provider.execute(ctx).await?;
                tracing::debug!(
                    provider = provider.name(),
                    components = ctx.components.len() - before,
                    "Component provider finished"
                );
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confix_core::RunId;
    use serde_json::json;

    fn context(cancellation: CancellationToken) -> ComponentProviderContext {
        ComponentProviderContext::new(
            RunLogger::new(RunId::new()),
            cancellation,
            ProjectDefinition::new("api", "/repo/api"),
            SolutionDefinition::new("/repo"),
        )
    }

    fn configured(name: &str) -> ComponentConfig {
        ComponentConfig {
            provider: "inline".to_string(),
            name: name.to_string(),
            schema: json!({"type": "object"}),
        }
    }

    #[tokio::test]
    async fn test_configured_provider_reports_components() {
        let provider =
            ConfiguredComponentProvider::new(vec![configured("Database"), configured("Logging")]);
        let mut ctx = context(CancellationToken::new());

        provider.execute(&mut ctx).await.unwrap();

        let names: Vec<String> = ctx.components.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["@inline/Database", "@inline/Logging"]);
    }

    #[tokio::test]
    async fn test_executor_runs_providers_in_order() {
        let executor = ComponentProviderExecutor::new()
            .with_provider(Arc::new(ConfiguredComponentProvider::new(vec![configured(
                "First",
            )])))
            .with_provider(Arc::new(ConfiguredComponentProvider::new(vec![configured(
                "Second",
            )])));
        let mut ctx = context(CancellationToken::new());

        executor.execute(&mut ctx).await.unwrap();

        assert_eq!(executor.len(), 2);
        assert_eq!(ctx.components[0].component_name, "First");
        assert_eq!(ctx.components[1].component_name, "Second");
    }

    #[tokio::test]
    async fn test_executor_observes_cancellation() {
        let executor = ComponentProviderExecutor::new()
            .with_provider(Arc::new(ConfiguredComponentProvider::new(vec![configured(
                "Database",
            )])));
        let token = CancellationToken::new();
        token.cancel();
        let mut ctx = context(token);

        let err = executor.execute(&mut ctx).await.unwrap_err();
        assert!(err.is_cancellation());
        assert!(ctx.components.is_empty());
    }
}
