//! `project reload`: compose and store the schema of a project.

use std::sync::Arc;

use confix_core::{relative_path, Component, ConfixResult, JsonSchemaDefinition};
use confix_middleware::{
    BoxFuture, FeatureKey, Handler, MiddlewareContext, Pipeline, RunLogger,
};

use super::{common_stages, PipelineOptions};
use crate::components::ComponentProviderContext;
use crate::features::{
    ComponentProviderExecutorFeature, ConfigurationFeature, ConfigurationFileFeature,
    JsonSchemaFeature, VariableReplacerFeature, VariableResolverFeature,
};
use crate::middlewares::{BuildComponentProviderMiddleware, JsonSchemaCollectionMiddleware};
use crate::schema::{DefaultProjectComposer, FileSchemaStore, ProjectComposer, SchemaStore};

/// Pipeline name used in logs and metrics.
pub const PROJECT_RELOAD: &str = "project_reload";

/// Builds the `project reload` pipeline.
///
/// # Example
///
/// ```no_run
/// use confix::pipelines::{PipelineOptions, ProjectReloadPipeline};
///
/// let pipeline = ProjectReloadPipeline::build(PipelineOptions::from_file("confix.toml")).unwrap();
/// assert_eq!(pipeline.name(), "project_reload");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProjectReloadPipeline;

impl ProjectReloadPipeline {
    /// Builds the pipeline with the file schema store and default composer.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::Configuration` if the pipeline is miswired.
    pub fn build(options: PipelineOptions) -> ConfixResult<Pipeline> {
        Self::build_with(
            options,
            ProjectReloadHandler::new(Arc::new(DefaultProjectComposer), Arc::new(FileSchemaStore)),
        )
    }

    /// Builds the pipeline around a custom handler.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::Configuration` if the pipeline is miswired.
    pub fn build_with(options: PipelineOptions, handler: ProjectReloadHandler) -> ConfixResult<Pipeline> {
        let components = options.component_providers.iter().cloned().fold(
            BuildComponentProviderMiddleware::new(),
            BuildComponentProviderMiddleware::with_provider,
        );

        common_stages(PROJECT_RELOAD, &options)
            .use_middleware(JsonSchemaCollectionMiddleware::new())
            .use_middleware(components)
            .use_handler(handler)
            .build()
    }
}

/// Terminal step of `project reload`.
///
/// Loads the components and materializes the references in their schemas,
/// lists the known variables, composes the schema and stores it. The stored schema
/// is recorded in [`JsonSchemaFeature`].
#[derive(Clone)]
pub struct ProjectReloadHandler {
    composer: Arc<dyn ProjectComposer>,
    store: Arc<dyn SchemaStore>,
}

impl ProjectReloadHandler {
    /// Creates the handler.
    #[must_use]
    pub fn new(composer: Arc<dyn ProjectComposer>, store: Arc<dyn SchemaStore>) -> Self {
        Self { composer, store }
    }

    async fn reload(&self, ctx: &mut MiddlewareContext) -> ConfixResult<()> {
        ctx.set_status("Reloading the schema of the project...");

        let configuration = ctx.features().get::<ConfigurationFeature>()?;
        let project = configuration.ensure_project()?;
        let solution = configuration.ensure_solution()?;
        let files: Vec<_> = ctx
            .features()
            .get::<ConfigurationFileFeature>()?
            .files
            .iter()
            .map(|f| relative_path(&f.path, &solution.directory))
            .collect();
        let executor = ctx
            .features()
            .get::<ComponentProviderExecutorFeature>()?
            .executor
            .clone();
        let resolver = ctx
            .features()
            .get::<VariableResolverFeature>()?
            .resolver
            .clone();
        let replacer = ctx
            .features()
            .get::<VariableReplacerFeature>()?
            .replacer
            .clone();

        ctx.set_status("Loading components...");
        let mut provider_ctx = ComponentProviderContext::new(
            ctx.logger().clone(),
            ctx.cancellation().clone(),
            project.clone(),
            solution.clone(),
        );
        executor.execute(&mut provider_ctx).await?;
        let mut components = provider_ctx.components;
        log_components_loaded(ctx.logger(), &components);

        for component in &mut components {
            component.schema = replacer.rewrite(&component.schema, ctx.cancellation()).await?;
        }

        ctx.set_status("Loading variables...");
        let variables = resolver.list_variables(ctx.cancellation()).await?;

        ctx.set_status("Composing the schema...");
        let schema = self.composer.compose(&components, &variables);
        ctx.logger().success(format!(
            "Schema composition completed for project {}",
            project.name
        ));

        let schema_file = self
            .store
            .store(&solution, &project, &schema, ctx.cancellation())
            .await?;

        let definition = JsonSchemaDefinition {
            relative_path_to_project: relative_path(&project.directory, &solution.directory),
            solution: solution.directory,
            file_match: files,
            schema_file,
            project,
        };
        ctx.features_mut()
            .get_mut::<JsonSchemaFeature>()?
            .schemas
            .push(definition);

        Ok(())
    }
}

impl std::fmt::Debug for ProjectReloadHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectReloadHandler").finish_non_exhaustive()
    }
}

impl Handler for ProjectReloadHandler {
    fn required_features(&self) -> Vec<FeatureKey> {
        vec![
            FeatureKey::of::<ConfigurationFeature>(),
            FeatureKey::of::<ConfigurationFileFeature>(),
            FeatureKey::of::<JsonSchemaFeature>(),
            FeatureKey::of::<ComponentProviderExecutorFeature>(),
            FeatureKey::of::<VariableResolverFeature>(),
            FeatureKey::of::<VariableReplacerFeature>(),
        ]
    }

    fn handle<'a>(&'a self, ctx: &'a mut MiddlewareContext) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(self.reload(ctx))
    }
}

fn log_components_loaded(logger: &RunLogger, components: &[Component]) {
    logger.success(format!("Loaded {} components", components.len()));
    for component in components {
        logger.information(format!("-  {component}"));
    }
}
