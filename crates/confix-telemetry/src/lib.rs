//! Observability for Confix pipelines.
//!
//! - **Logging**: structured `tracing` output, pretty for terminals or JSON
//!   for machines, filtered with `EnvFilter`
//! - **Metrics**: counters and histograms through the `metrics` facade; the
//!   embedding application decides which recorder (if any) to install
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `confix_pipeline_runs_total` | Counter | `pipeline`, `outcome` | Finished pipeline runs |
//! | `confix_pipeline_duration_seconds` | Histogram | `pipeline` | Pipeline run latency |
//! | `confix_stage_duration_seconds` | Histogram | `stage` | Time spent inside one stage |
//! | `confix_variables_resolved_total` | Counter | `provider` | Variables resolved per provider |
//!
//! # Example
//!
//! ```rust,ignore
//! use confix_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig {
//!     level: "debug".to_string(),
//!     ..LogConfig::default()
//! })?;
//! tracing::info!(project = "api", "Reloading schema");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use metrics::{describe_metrics, record_pipeline_run, record_stage, record_variables_resolved};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
