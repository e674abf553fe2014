//! Status reporting.
//!
//! Stages report coarse progress ("Loading components", "Composing schema")
//! through a [`StatusSink`]. Status is purely informational: nothing reads it
//! back and it never affects control flow.

/// Receiver of status messages.
pub trait StatusSink: Send + Sync {
    /// Replaces the current status message.
    fn set_status(&self, message: &str);
}

/// Sink that emits status messages as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn set_status(&self, message: &str) {
        tracing::info!(target: "confix::status", "{message}");
    }
}

impl<F> StatusSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn set_status(&self, message: &str) {
        self(message);
    }
}
