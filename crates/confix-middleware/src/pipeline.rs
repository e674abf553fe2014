//! Middleware pipeline.
//!
//! A [`Pipeline`] is an ordered list of stages wrapped around exactly one
//! terminal [`Handler`]. It is immutable once built and can execute any
//! number of fresh contexts.
//!
//! ```text
//! ctx → stage 1 → stage 2 → ... → stage N → handler
//!              ←          ←     ←         ←
//! ```

use std::sync::Arc;
use std::time::Instant;

use confix_core::{ConfixError, ConfixResult};
use confix_telemetry::record_pipeline_run;
use tracing::{debug, Instrument};

use crate::context::{MiddlewareContext, RunState};
use crate::handler::Handler;
use crate::middleware::{Middleware, Next};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

const DEFAULT_PIPELINE_NAME: &str = "pipeline";

/// An ordered list of stages around one handler.
///
/// # Example
///
/// ```
/// use confix_middleware::{FnHandler, MiddlewareContext, Pipeline, RunState};
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder()
///     .use_handler(FnHandler::new(|ctx| {
///         Box::pin(async move {
///             ctx.features_mut().set(1_u8);
///             Ok(())
///         })
///     }))
///     .build()
///     .unwrap();
///
/// let mut ctx = MiddlewareContext::default();
/// pipeline.execute(&mut ctx).await.unwrap();
/// assert_eq!(ctx.state(), RunState::Completed);
/// # });
/// ```
pub struct Pipeline {
    name: &'static str,
    stages: Vec<BoxedMiddleware>,
    handler: Arc<dyn Handler>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The pipeline name used in logs and metrics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Executes the pipeline against `ctx`.
    ///
    /// The context moves to `Running`, then to `Completed`, `Faulted` or
    /// `Canceled`. Features written by stages stay in `ctx` whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::ContextReused` if `ctx` was already executed,
    /// otherwise the first error raised by a stage, the handler, or the
    /// engine (`Cancelled`, `MissingFeature`).
    pub async fn execute(&self, ctx: &mut MiddlewareContext) -> ConfixResult<()> {
        if ctx.state() != RunState::NotStarted {
            return Err(ConfixError::ContextReused);
        }

        ctx.set_state(RunState::Running);
        ctx.logger().record_pipeline(self.name);
        let span = ctx.logger().span().clone();
        let started = Instant::now();

        let result = self.build_chain().run(ctx).instrument(span).await;

        let state = match &result {
            Ok(()) => RunState::Completed,
            Err(err) if err.is_cancellation() => RunState::Canceled,
            Err(_) => RunState::Faulted,
        };
        ctx.set_state(state);
        record_pipeline_run(self.name, state.as_str(), started.elapsed());
        debug!(pipeline = self.name, state = %state, "Pipeline finished");

        result
    }

    fn build_chain(&self) -> Next<'_> {
        let mut next = Next::handler(self.handler.as_ref());

        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        next
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder {
    name: &'static str,
    stages: Vec<BoxedMiddleware>,
    handlers: Vec<Arc<dyn Handler>>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::named(DEFAULT_PIPELINE_NAME)
    }

    /// Creates an empty builder for a named pipeline.
    #[must_use]
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            stages: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Appends a stage. Stages run in registration order.
    #[must_use]
    pub fn use_middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Registers the terminal handler.
    #[must_use]
    pub fn use_handler<H: Handler>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::Configuration` unless exactly one handler was
    /// registered.
    pub fn build(mut self) -> ConfixResult<Pipeline> {
        let handler = match self.handlers.len() {
            1 => self.handlers.remove(0),
            0 => {
                return Err(ConfixError::configuration(format!(
                    "pipeline '{}' has no handler",
                    self.name
                )))
            }
            n => {
                return Err(ConfixError::configuration(format!(
                    "pipeline '{}' has {n} handlers, expected exactly one",
                    self.name
                )))
            }
        };

        Ok(Pipeline {
            name: self.name,
            stages: self.stages,
            handler,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use crate::middleware::FnMiddleware;

    fn noop_handler() -> impl Handler {
        FnHandler::new(|_ctx| Box::pin(async { Ok(()) }))
    }

    #[test]
    fn test_builder_requires_handler() {
        let err = Pipeline::builder().build().unwrap_err();
        assert!(matches!(err, ConfixError::Configuration { .. }));
    }

    #[test]
    fn test_builder_rejects_two_handlers() {
        let err = PipelineBuilder::named("double")
            .use_handler(noop_handler())
            .use_handler(noop_handler())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("2 handlers"));
    }

    #[test]
    fn test_stage_names() {
        let pipeline = PipelineBuilder::named("names")
            .use_middleware(FnMiddleware::new("first", |ctx, next| Box::pin(next.run(ctx))))
            .use_middleware(FnMiddleware::new("second", |ctx, next| Box::pin(next.run(ctx))))
            .use_handler(noop_handler())
            .build()
            .unwrap();

        assert_eq!(pipeline.name(), "names");
        assert_eq!(pipeline.stage_count(), 2);
        assert_eq!(pipeline.stage_names(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_execute_sets_terminal_state() {
        let pipeline = Pipeline::builder()
            .use_handler(noop_handler())
            .build()
            .unwrap();

        let mut ctx = MiddlewareContext::default();
        pipeline.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.state(), RunState::Completed);
    }

    #[tokio::test]
    async fn test_execute_rejects_reused_context() {
        let pipeline = Pipeline::builder()
            .use_handler(noop_handler())
            .build()
            .unwrap();

        let mut ctx = MiddlewareContext::default();
        pipeline.execute(&mut ctx).await.unwrap();

        let err = pipeline.execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, ConfixError::ContextReused));
        assert_eq!(ctx.state(), RunState::Completed);
    }

    #[tokio::test]
    async fn test_failed_handler_faults_run() {
        let pipeline = Pipeline::builder()
            .use_handler(FnHandler::new(|_ctx| {
                Box::pin(async { Err(ConfixError::unhandled("boom")) })
            }))
            .build()
            .unwrap();

        let mut ctx = MiddlewareContext::default();
        assert!(pipeline.execute(&mut ctx).await.is_err());
        assert_eq!(ctx.state(), RunState::Faulted);
    }
}
