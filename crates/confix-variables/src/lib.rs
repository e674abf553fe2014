//! Variable references for Confix.
//!
//! Configuration documents can hold references such as
//! `"${shared:db.password}"` in place of literal values. This crate finds
//! them, resolves them through pluggable providers and produces a new
//! document with the resolved values in place.
//!
//! - [`VariablePath`] parses and formats a single reference
//! - [`scan`] collects the references of a document
//! - [`VariableResolver`] turns a set of references into values
//! - [`rewrite`] substitutes resolved values at the scanned occurrences
//! - [`VariableReplacer`] runs the three steps for one document
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use confix_variables::{LocalVariableProvider, ProviderVariableResolver, VariableReplacer};
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let resolver = ProviderVariableResolver::new()
//!     .with_provider(Arc::new(LocalVariableProvider::new("var", json!({"x": "VALUE"}))));
//! let replacer = VariableReplacer::new(Arc::new(resolver));
//!
//! let doc = json!({"a": "${var:x}", "b": 5});
//! let out = replacer.rewrite(&doc, &CancellationToken::new()).await.unwrap();
//! assert_eq!(out, json!({"a": "VALUE", "b": 5}));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/confix-variables/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod path;
mod provider;
mod replacer;
mod resolver;
mod rewriter;
mod scanner;

pub use error::{VariableError, VariableResult};
pub use path::{VariablePath, SYNTAX_VERSION};
pub use provider::{LocalVariableProvider, VariableProvider};
pub use replacer::VariableReplacer;
pub use resolver::{ProviderVariableResolver, ResolutionMap, VariableResolver};
pub use rewriter::rewrite;
pub use scanner::{scan, ScanResult, VariableOccurrence};
