//! Typed project configuration for Confix.
//!
//! This crate loads the configuration a Confix project runs with:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`ConfixConfig`] holds the sections of a project configuration:
//!
//! - [`ProjectConfig`] - project name, directory and configuration files
//! - [`SolutionConfig`] - the solution root schemas are registered against
//! - [`EnvironmentConfig`] - the active environment
//! - [`ComponentConfig`] - inline components and their schemas
//! - [`VariablesConfig`] - variable providers
//! - [`LoggingConfig`] - log level and format
//!
//! # Example
//!
//! ```no_run
//! use confix_config::{ConfigLoader, DEFAULT_ENV_PREFIX};
//!
//! # fn main() -> Result<(), confix_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("confix.toml")?
//!     .with_env_prefix(DEFAULT_ENV_PREFIX)
//!     .load()?;
//!
//! println!("Environment: {}", config.environment.name);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [project]
//! name = "api"
//! files = ["appsettings.json"]
//!
//! [solution]
//! directory = "../.."
//!
//! [environment]
//! name = "development"
//!
//! [[components]]
//! provider = "shared"
//! name = "Database"
//! schema = { type = "object" }
//!
//! [[variables.providers]]
//! name = "shared"
//! type = "local"
//! file = "variables.json"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Scalar values can be overridden via environment variables using the
//! format `PREFIX__SECTION__KEY`. For example:
//!
//! - `CONFIX__PROJECT__NAME=api`
//! - `CONFIX__ENVIRONMENT__NAME=production`
//! - `CONFIX__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::*;
