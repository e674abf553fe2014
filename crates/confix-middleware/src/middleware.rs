//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that every pipeline stage
//! implements. A stage receives the run context and a [`Next`] continuation;
//! it may work before and after calling `next.run(ctx)`, or return without
//! calling it to end the run early.
//!
//! # Example
//!
//! ```
//! use confix_core::ConfixResult;
//! use confix_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};
//!
//! struct Announce;
//!
//! impl Middleware for Announce {
//!     fn name(&self) -> &'static str {
//!         "announce"
//!     }
//!
//!     fn invoke<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, ConfixResult<()>> {
//!         Box::pin(async move {
//!             ctx.set_status("Starting");
//!             next.run(ctx).await?;
//!             ctx.set_status("Finished");
//!             Ok(())
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use confix_core::{ConfixError, ConfixResult};
use confix_telemetry::record_stage;
use tracing::debug;

use crate::context::MiddlewareContext;
use crate::handler::Handler;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A pipeline stage.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once
/// - A stage does not swallow errors returned by `next.run()`
/// - A stage that does not call `next.run()` ends the run successfully
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this stage.
    ///
    /// This name is used for logging, metrics, and debugging.
    fn name(&self) -> &'static str;

    /// Runs the stage.
    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>>;
}

/// Continuation to the rest of the pipeline.
///
/// Consumed by [`run`](Next::run), so the remaining stages execute at most
/// once per stage invocation.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(&'a dyn Handler),
}

impl<'a> Next<'a> {
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    pub(crate) fn handler(handler: &'a dyn Handler) -> Self {
        Self {
            inner: NextInner::Handler(handler),
        }
    }

    /// Invokes the next stage, or the handler at the end of the chain.
    ///
    /// Cancellation is checked before anything runs. Before the handler runs,
    /// every feature it requires must be present.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::Cancelled` if the run was cancelled,
    /// `ConfixError::MissingFeature` if a required feature is absent, or the
    /// error of the stage or handler.
    pub async fn run(self, ctx: &mut MiddlewareContext) -> ConfixResult<()> {
        ctx.ensure_not_cancelled()?;

        match self.inner {
            NextInner::Chain { middleware, next } => {
                let stage = middleware.name();
                debug!(stage, "Entering stage");
                let started = Instant::now();
                let result = middleware.invoke(ctx, *next).await;
                record_stage(stage, started.elapsed());
                result
            }
            NextInner::Handler(handler) => {
                for key in handler.required_features() {
                    if !ctx.features().contains_key(&key) {
                        return Err(ConfixError::missing_feature(key.name()));
                    }
                }
                handler.handle(ctx).await
            }
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use confix_middleware::FnMiddleware;
///
/// let stage = FnMiddleware::new("status", |ctx, next| {
///     Box::pin(async move {
///         ctx.set_status("Running");
///         next.run(ctx).await
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Next<'a>) -> BoxFuture<'a, ConfixResult<()>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Next<'a>) -> BoxFuture<'a, ConfixResult<()>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        (self.func)(ctx, next)
    }
}
