//! Pipeline metrics.
//!
//! Recording goes through the `metrics` facade. Without an installed
//! recorder every call is a no-op, so pipelines can record unconditionally.
//!
//! # Example
//!
//! ```rust,ignore
//! use confix_telemetry::metrics::record_stage;
//!
//! record_stage("variables", Duration::from_millis(12));
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Counter of finished pipeline runs.
pub const PIPELINE_RUNS_TOTAL: &str = "confix_pipeline_runs_total";

/// Histogram of pipeline run latency.
pub const PIPELINE_DURATION_SECONDS: &str = "confix_pipeline_duration_seconds";

/// Histogram of time spent inside one stage, including downstream stages.
pub const STAGE_DURATION_SECONDS: &str = "confix_stage_duration_seconds";

/// Counter of resolved variables per provider.
pub const VARIABLES_RESOLVED_TOTAL: &str = "confix_variables_resolved_total";

/// Registers descriptions for all standard metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(PIPELINE_RUNS_TOTAL, "Total number of finished pipeline runs");
    describe_histogram!(PIPELINE_DURATION_SECONDS, "Pipeline run duration in seconds");
    describe_histogram!(
        STAGE_DURATION_SECONDS,
        "Duration of a middleware stage and everything it wraps, in seconds"
    );
    describe_counter!(
        VARIABLES_RESOLVED_TOTAL,
        "Total number of variables resolved, by provider"
    );
}

/// Records a finished pipeline run.
///
/// # Arguments
///
/// * `pipeline` - Pipeline name (e.g., "project_reload")
/// * `outcome` - Terminal state ("completed", "faulted", "canceled")
/// * `duration` - Wall time of the run
pub fn record_pipeline_run(pipeline: &str, outcome: &str, duration: Duration) {
    counter!(
        PIPELINE_RUNS_TOTAL,
        "pipeline" => pipeline.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(PIPELINE_DURATION_SECONDS, "pipeline" => pipeline.to_string())
        .record(duration.as_secs_f64());
}

/// Records the time spent inside a stage.
pub fn record_stage(stage: &str, duration: Duration) {
    histogram!(STAGE_DURATION_SECONDS, "stage" => stage.to_string())
        .record(duration.as_secs_f64());
}

/// Records how many variables a provider resolved.
pub fn record_variables_resolved(provider: &str, count: usize) {
    counter!(VARIABLES_RESOLVED_TOTAL, "provider" => provider.to_string())
        .increment(count as u64);
}
