//! Run timing middleware.
//!
//! Wraps the rest of the pipeline, measures how long it took and logs the
//! elapsed time once the inner stages return, whether they succeeded or not.
//!
//! ```text
//! [Timing] → stage → ... → handler
//!    ↑ logs "Completed in 12 ms" on the way back
//! ```

use std::time::{Duration, Instant};

use confix_core::ConfixResult;

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Duration of the stages wrapped by [`TimingMiddleware`].
///
/// Set after the inner stages return, so the caller can read it from the
/// context once the run is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

impl Elapsed {
    /// Whole milliseconds.
    #[must_use]
    pub fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }
}

/// Middleware that times the remainder of the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingMiddleware;

impl TimingMiddleware {
    /// Creates a timing middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for TimingMiddleware {
    fn name(&self) -> &'static str {
        "timing"
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(async move {
            let started = Instant::now();
            let result = next.run(ctx).await;
            let elapsed = started.elapsed();

            ctx.features_mut().set(Elapsed(elapsed));
            match &result {
                Ok(()) => ctx
                    .logger()
                    .information(format!("Completed in {} ms", elapsed.as_millis())),
                Err(err) if err.is_cancellation() => ctx
                    .logger()
                    .warning(format!("Cancelled after {} ms", elapsed.as_millis())),
                Err(_) => ctx
                    .logger()
                    .error(format!("Failed after {} ms", elapsed.as_millis())),
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use crate::pipeline::Pipeline;
    use confix_core::ConfixError;

    #[tokio::test]
    async fn test_records_elapsed_on_success() {
        let pipeline = Pipeline::builder()
            .use_middleware(TimingMiddleware::new())
            .use_handler(FnHandler::new(|_ctx| Box::pin(async { Ok(()) })))
            .build()
            .unwrap();

        let mut ctx = MiddlewareContext::default();
        pipeline.execute(&mut ctx).await.unwrap();

        assert!(ctx.features().contains::<Elapsed>());
    }

    #[tokio::test]
    async fn test_records_elapsed_on_failure() {
        let pipeline = Pipeline::builder()
            .use_middleware(TimingMiddleware::new())
            .use_handler(FnHandler::new(|_ctx| {
                Box::pin(async { Err(ConfixError::configuration("bad project")) })
            }))
            .build()
            .unwrap();

        let mut ctx = MiddlewareContext::default();
        assert!(pipeline.execute(&mut ctx).await.is_err());
        assert!(ctx.features().contains::<Elapsed>());
    }

    #[test]
    fn test_name() {
        assert_eq!(TimingMiddleware::new().name(), "timing");
    }
}
