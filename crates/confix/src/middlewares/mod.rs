//! Stages of the project pipelines.
//!
//! | Stage | Sets |
//! |---|---|
//! | [`LoadConfigurationMiddleware`] | `ConfigurationFeature` |
//! | [`ReadConfigurationFilesMiddleware`] | `ConfigurationFileFeature` |
//! | [`EnvironmentMiddleware`] | `EnvironmentFeature` |
//! | [`VariableMiddleware`] | `VariableResolverFeature`, `VariableReplacerFeature` |
//! | [`JsonSchemaCollectionMiddleware`] | `JsonSchemaFeature` |
//! | [`BuildComponentProviderMiddleware`] | `ComponentProviderExecutorFeature` |

mod components;
mod configuration;
mod environment;
mod json_schema;
mod variables;

pub use components::BuildComponentProviderMiddleware;
pub use configuration::{
    LoadConfigurationMiddleware, ReadConfigurationFilesMiddleware, DEFAULT_CONFIG_FILE,
};
pub use environment::{EnvironmentMiddleware, ENVIRONMENT_VARIABLE};
pub use json_schema::JsonSchemaCollectionMiddleware;
pub use variables::VariableMiddleware;
