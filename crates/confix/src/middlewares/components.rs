//! Component provider construction.

use std::sync::Arc;

use confix_core::ConfixResult;
use confix_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};

use crate::components::{ComponentProvider, ComponentProviderExecutor, ConfiguredComponentProvider};
use crate::features::{ComponentProviderExecutorFeature, ConfigurationFeature};

/// Builds the project's component provider into
/// [`ComponentProviderExecutorFeature`].
///
/// The executor always runs the components declared in the configuration,
/// followed by any provider added with [`with_provider`](Self::with_provider).
#[derive(Clone, Default)]
pub struct BuildComponentProviderMiddleware {
    extra: Vec<Arc<dyn ComponentProvider>>,
}

impl BuildComponentProviderMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider run after the configured components.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ComponentProvider>) -> Self {
        self.extra.push(provider);
        self
    }
}

impl std::fmt::Debug for BuildComponentProviderMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildComponentProviderMiddleware")
            .field("extra", &self.extra.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Middleware for BuildComponentProviderMiddleware {
    fn name(&self) -> &'static str {
        "build_component_provider"
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            let configured = ctx
                .features()
                .get::<ConfigurationFeature>()?
                .config
                .components
                .clone();

            let executor = self.extra.iter().cloned().fold(
                ComponentProviderExecutor::new()
                    .with_provider(Arc::new(ConfiguredComponentProvider::new(configured))),
                ComponentProviderExecutor::with_provider,
            );

            ctx.features_mut().set(ComponentProviderExecutorFeature {
                executor: Arc::new(executor),
            });
            next.run(ctx).await
        })
    }
}
