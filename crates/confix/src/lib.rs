//! # Confix
//!
//! Composes the configuration schema of a project from its components and
//! materializes `${provider:path}` variable references in its configuration
//! files.
//!
//! - [`pipelines`] - `project reload` and `project build`
//! - [`middlewares`] - The stages those pipelines are made of
//! - [`features`] - State the stages hand to each other
//! - [`components`], [`schema`] - Component discovery, composition, storage
//! - [`ExitStatus`] - How a run's outcome maps to a process exit code
//!
//! ## Example
//!
//! ```no_run
//! use confix::pipelines::{PipelineOptions, ProjectReloadPipeline};
//! use confix::ExitStatus;
//! use confix_middleware::MiddlewareContext;
//!
//! # async fn run() {
//! let pipeline = ProjectReloadPipeline::build(PipelineOptions::from_file("confix.toml")).unwrap();
//! let mut ctx = MiddlewareContext::default();
//! let status = ExitStatus::from_result(&pipeline.execute(&mut ctx).await);
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/confix/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod components;
mod exit;
pub mod features;
pub mod middlewares;
pub mod pipelines;
pub mod schema;

pub use exit::ExitStatus;

/// Version of the `confix` command.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
