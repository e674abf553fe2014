//! Active environment selection.

use confix_core::{ConfixError, ConfixResult};
use confix_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};

use crate::features::{ConfigurationFeature, EnvironmentFeature};

/// Environment variable overriding the configured environment.
pub const ENVIRONMENT_VARIABLE: &str = "CONFIX_ENVIRONMENT";

/// Selects the active environment into [`EnvironmentFeature`].
///
/// Precedence: an explicit override, then `CONFIX_ENVIRONMENT`, then
/// `environment.name` of the configuration.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentMiddleware {
    explicit: Option<String>,
}

impl EnvironmentMiddleware {
    /// Creates the stage without an explicit override.
    #[must_use]
    pub const fn new() -> Self {
        Self { explicit: None }
    }

    /// Forces the environment, e.g. from a command line flag.
    #[must_use]
    pub fn with_override(mut self, environment: Option<String>) -> Self {
        self.explicit = environment;
        self
    }

    fn select(&self, configured: &str) -> String {
        self.explicit
            .clone()
            .or_else(|| std::env::var(ENVIRONMENT_VARIABLE).ok())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| configured.to_string())
    }
}

impl Middleware for EnvironmentMiddleware {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            let configured = &ctx
                .features()
                .get::<ConfigurationFeature>()?
                .config
                .environment
                .name;
            let name = self.select(configured);

            if name.trim().is_empty() {
                return Err(ConfixError::configuration("no environment is selected"));
            }

            tracing::debug!(environment = %name, "Selected environment");
            ctx.features_mut().set(EnvironmentFeature { name });
            next.run(ctx).await
        })
    }
}
