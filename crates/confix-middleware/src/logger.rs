//! Per-run logging handle.

use confix_core::RunId;
use std::fmt::Display;
use tracing::Span;

/// Logger handed to every stage through the run context.
///
/// Events are emitted inside the run's span, so every line carries the
/// run id and pipeline name.
///
/// # Example
///
/// ```
/// use confix_core::RunId;
/// use confix_middleware::RunLogger;
///
/// let logger = RunLogger::new(RunId::new());
/// logger.information("Loaded 3 components");
/// logger.success("Schema composition completed for project api");
/// ```
#[derive(Debug, Clone)]
pub struct RunLogger {
    span: Span,
}

impl RunLogger {
    /// Creates a logger with a fresh span for `run_id`.
    #[must_use]
    pub fn new(run_id: RunId) -> Self {
        Self {
            span: tracing::info_span!(
                "confix_run",
                run_id = %run_id,
                pipeline = tracing::field::Empty,
            ),
        }
    }

    /// The run's span.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Records the pipeline name on the run span.
    pub fn record_pipeline(&self, pipeline: &str) {
        self.span.record("pipeline", pipeline);
    }

    /// Logs a successful outcome.
    pub fn success(&self, message: impl Display) {
        let _guard = self.span.enter();
        tracing::info!(outcome = "success", "{message}");
    }

    /// Logs an informational message.
    pub fn information(&self, message: impl Display) {
        let _guard = self.span.enter();
        tracing::info!("{message}");
    }

    /// Logs a warning.
    pub fn warning(&self, message: impl Display) {
        let _guard = self.span.enter();
        tracing::warn!("{message}");
    }

    /// Logs an error.
    pub fn error(&self, message: impl Display) {
        let _guard = self.span.enter();
        tracing::error!("{message}");
    }
}
