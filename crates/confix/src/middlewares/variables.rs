//! Variable resolver construction.

use std::sync::Arc;

use confix_core::{ConfixError, ConfixResult};
use confix_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};
use confix_variables::{ProviderVariableResolver, VariableReplacer, VariableResolver};

use crate::features::{
    ConfigurationFeature, EnvironmentFeature, VariableReplacerFeature, VariableResolverFeature,
};

/// Builds the variable resolver for the active environment.
///
/// Sets [`VariableResolverFeature`] and a [`VariableReplacerFeature`] sharing
/// the same resolver. Providers come from `[[variables.providers]]` unless a
/// resolver is supplied with [`with_resolver`](Self::with_resolver).
#[derive(Clone, Default)]
pub struct VariableMiddleware {
    resolver: Option<Arc<dyn VariableResolver>>,
}

impl VariableMiddleware {
    /// Builds the resolver from the configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `resolver` instead of the configured providers.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn VariableResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    async fn build_resolver(
        &self,
        ctx: &MiddlewareContext,
    ) -> ConfixResult<Arc<dyn VariableResolver>> {
        if let Some(resolver) = &self.resolver {
            return Ok(resolver.clone());
        }

        let mut config = ctx.features().get::<ConfigurationFeature>()?.config.clone();
        if let Some(environment) = ctx.features().try_get::<EnvironmentFeature>() {
            config.environment.name.clone_from(&environment.name);
        }

        let resolver = tokio::select! {
            biased;
            () = ctx.cancellation().cancelled() => return Err(ConfixError::Cancelled),
            resolver = ProviderVariableResolver::from_config(&config) => resolver?,
        };

        tracing::debug!(
            providers = ?resolver.provider_names().collect::<Vec<_>>(),
            environment = %config.environment.name,
            "Built variable resolver"
        );
        Ok(Arc::new(resolver))
    }
}

impl std::fmt::Debug for VariableMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableMiddleware")
            .field("custom_resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Middleware for VariableMiddleware {
    fn name(&self) -> &'static str {
        "variables"
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            let resolver = self.build_resolver(ctx).await?;

            ctx.features_mut().set(VariableReplacerFeature {
                replacer: VariableReplacer::new(resolver.clone()),
            });
            ctx.features_mut().set(VariableResolverFeature { resolver });
            next.run(ctx).await
        })
    }
}
