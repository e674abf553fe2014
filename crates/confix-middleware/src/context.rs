//! Run context.
//!
//! A [`MiddlewareContext`] is created for one pipeline run and threaded
//! through every stage. It owns the run's cancellation token, status sink,
//! logger and [`Features`].

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use confix_core::{ConfixError, ConfixResult, RunId};
use tokio_util::sync::CancellationToken;

use crate::features::Features;
use crate::logger::RunLogger;
use crate::status::{StatusSink, TracingStatusSink};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// The context has not been executed.
    NotStarted,
    /// A pipeline is executing the context.
    Running,
    /// The handler returned successfully, or a stage short-circuited.
    Completed,
    /// A stage or the handler failed.
    Faulted,
    /// The run observed cancellation.
    Canceled,
}

impl RunState {
    /// Returns `true` for `Completed`, `Faulted` and `Canceled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Faulted | Self::Canceled)
    }

    /// Lowercase name, used as a metrics label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Faulted => "faulted",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context that flows through the middleware pipeline.
///
/// # Example
///
/// ```
/// use confix_middleware::{MiddlewareContext, RunState};
/// use tokio_util::sync::CancellationToken;
///
/// let mut ctx = MiddlewareContext::new(CancellationToken::new());
/// ctx.features_mut().set(42_u32);
///
/// assert_eq!(ctx.state(), RunState::NotStarted);
/// assert_eq!(*ctx.features().get::<u32>().unwrap(), 42);
/// ```
pub struct MiddlewareContext {
    run_id: RunId,
    state: RunState,
    cancellation: CancellationToken,
    status: Arc<dyn StatusSink>,
    logger: RunLogger,
    features: Features,
    started_at: Instant,
}

impl MiddlewareContext {
    /// Creates a context observing `cancellation`.
    #[must_use]
    pub fn new(cancellation: CancellationToken) -> Self {
        Self::with_run_id(RunId::new(), cancellation)
    }

    /// Creates a context with a specific run id.
    #[must_use]
    pub fn with_run_id(run_id: RunId, cancellation: CancellationToken) -> Self {
        Self {
            run_id,
            state: RunState::NotStarted,
            cancellation,
            status: Arc::new(TracingStatusSink),
            logger: RunLogger::new(run_id),
            features: Features::new(),
            started_at: Instant::now(),
        }
    }

    /// Replaces the status sink.
    #[must_use]
    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.status = sink;
        self
    }

    /// Returns the run id.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the run state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    /// The run's cancellation token.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns `true` if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fails with `ConfixError::Cancelled` if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::Cancelled` once the token has fired.
    pub fn ensure_not_cancelled(&self) -> ConfixResult<()> {
        if self.is_cancelled() {
            Err(ConfixError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Reports a status message.
    pub fn set_status(&self, message: &str) {
        self.status.set_status(message);
    }

    /// The run logger.
    #[must_use]
    pub const fn logger(&self) -> &RunLogger {
        &self.logger
    }

    /// The run's features.
    #[must_use]
    pub const fn features(&self) -> &Features {
        &self.features
    }

    /// The run's features, mutably.
    pub fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    /// Consumes the context, returning its features.
    #[must_use]
    pub fn into_features(self) -> Features {
        self.features
    }

    /// Time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}

impl fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("run_id", &self.run_id)
            .field("state", &self.state)
            .field("cancelled", &self.is_cancelled())
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_new_context() {
        let ctx = MiddlewareContext::default();
        assert_eq!(ctx.state(), RunState::NotStarted);
        assert!(!ctx.is_cancelled());
        assert!(ctx.features().is_empty());
    }

    #[test]
    fn test_with_run_id() {
        let run_id = RunId::new();
        let ctx = MiddlewareContext::with_run_id(run_id, CancellationToken::new());
        assert_eq!(ctx.run_id(), run_id);
    }

    #[test]
    fn test_ensure_not_cancelled() {
        let token = CancellationToken::new();
        let ctx = MiddlewareContext::new(token.clone());
        assert!(ctx.ensure_not_cancelled().is_ok());

        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.ensure_not_cancelled().unwrap_err().is_cancellation());
    }

    #[test]
    fn test_status_sink_receives_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            move |message: &str| seen.lock().unwrap().push(message.to_string())
        };

        let ctx = MiddlewareContext::default().with_status_sink(Arc::new(sink));
        ctx.set_status("Loading");
        assert_eq!(*seen.lock().unwrap(), vec!["Loading"]);
    }

    #[test]
    fn test_into_features() {
        let mut ctx = MiddlewareContext::default();
        ctx.features_mut().set("value");
        let features = ctx.into_features();
        assert_eq!(*features.get::<&str>().unwrap(), "value");
    }

    #[test]
    fn test_run_state_terminal() {
        assert!(!RunState::NotStarted.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Faulted.is_terminal());
        assert!(RunState::Canceled.is_terminal());
        assert_eq!(RunState::Canceled.to_string(), "canceled");
    }
}
