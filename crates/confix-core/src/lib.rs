//! # Confix Core
//!
//! Core types shared by every Confix crate.
//!
//! - [`RunId`] - UUID v7 identifier of a single pipeline run
//! - [`ConfixError`] - The error taxonomy every stage and collaborator reports through
//! - [`ProjectDefinition`], [`SolutionDefinition`] - Where a project lives
//! - [`Component`] - A loaded component and the schema it contributes
//! - [`JsonSchemaDefinition`] - The artifact produced by a schema reload

#![doc(html_root_url = "https://docs.rs/confix-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod project;

pub use context::RunId;
pub use error::{ConfixError, ConfixResult, ErrorCategory};
pub use project::{
    relative_path, Component, JsonSchemaDefinition, ProjectDefinition, SchemaFile,
    SolutionDefinition,
};
