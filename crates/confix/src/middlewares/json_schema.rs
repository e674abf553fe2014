//! Schema collection.

use confix_core::ConfixResult;
use confix_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};

use crate::features::JsonSchemaFeature;

/// Provides an empty [`JsonSchemaFeature`] for handlers to push into, and
/// reports what was collected once the rest of the run succeeded.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaCollectionMiddleware;

impl JsonSchemaCollectionMiddleware {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for JsonSchemaCollectionMiddleware {
    fn name(&self) -> &'static str {
        "json_schema_collection"
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            if !ctx.features().contains::<JsonSchemaFeature>() {
                ctx.features_mut().set(JsonSchemaFeature::default());
            }

            next.run(ctx).await?;

            let schemas = &ctx.features().get::<JsonSchemaFeature>()?.schemas;
            for schema in schemas {
                tracing::debug!(
                    project = %schema.project.name,
                    schema = %schema.schema_file.path.display(),
                    "Collected schema"
                );
            }
            ctx.logger()
                .information(format!("Collected {} schema(s)", schemas.len()));
            Ok(())
        })
    }
}
