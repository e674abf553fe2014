//! Terminal handlers.

use confix_core::ConfixResult;

use crate::context::MiddlewareContext;
use crate::features::FeatureKey;
use crate::middleware::BoxFuture;

/// The terminal step of a pipeline.
///
/// A handler declares the features it reads. The engine verifies all of them
/// are present before [`handle`](Handler::handle) is called, so a missing
/// feature is reported before any handler work is done.
pub trait Handler: Send + Sync + 'static {
    /// Features that must be present when the handler runs.
    fn required_features(&self) -> Vec<FeatureKey> {
        Vec::new()
    }

    /// Runs the handler.
    fn handle<'a>(&'a self, ctx: &'a mut MiddlewareContext) -> BoxFuture<'a, ConfixResult<()>>;
}

/// A handler built from a closure.
///
/// # Example
///
/// ```
/// use confix_middleware::FnHandler;
///
/// struct ComponentCount(usize);
///
/// let handler = FnHandler::new(|ctx| {
///     Box::pin(async move {
///         let count = ctx.features().get::<ComponentCount>()?.0;
///         ctx.logger().information(format!("Loaded {count} components"));
///         Ok(())
///     })
/// })
/// .requires::<ComponentCount>();
/// ```
pub struct FnHandler<F> {
    func: F,
    required: Vec<FeatureKey>,
}

impl<F> FnHandler<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext) -> BoxFuture<'a, ConfixResult<()>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a handler without feature requirements.
    pub fn new(func: F) -> Self {
        Self {
            func,
            required: Vec::new(),
        }
    }

    /// Declares that the handler reads feature `T`.
    #[must_use]
    pub fn requires<T: Send + Sync + 'static>(mut self) -> Self {
        self.required.push(FeatureKey::of::<T>());
        self
    }
}

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext) -> BoxFuture<'a, ConfixResult<()>>
        + Send
        + Sync
        + 'static,
{
    fn required_features(&self) -> Vec<FeatureKey> {
        self.required.clone()
    }

    fn handle<'a>(&'a self, ctx: &'a mut MiddlewareContext) -> BoxFuture<'a, ConfixResult<()>> {
        (self.func)(ctx)
    }
}
