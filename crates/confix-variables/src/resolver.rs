//! Resolver interface and the provider-dispatching resolver.

use std::sync::Arc;

use confix_config::{ConfixConfig, VariableProviderConfig, VariableProviderKind};
use futures_util::future::{try_join_all, BoxFuture};
use indexmap::IndexMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{LocalVariableProvider, VariableError, VariablePath, VariableProvider, VariableResult};

/// Resolved values keyed by reference, in request order.
pub type ResolutionMap = IndexMap<VariablePath, Value>;

/// Turns references into values.
///
/// Implementations observe `cancel` at their own suspension points and
/// return `VariableError::Cancelled` when it fires.
pub trait VariableResolver: Send + Sync {
    /// Resolves every path in `paths`.
    ///
    /// # Errors
    ///
    /// Returns `VariableError::Unresolved` naming the first path without a
    /// value.
    fn resolve<'a>(
        &'a self,
        paths: &'a [VariablePath],
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, VariableResult<ResolutionMap>>;

    /// Lists every reference the resolver can answer.
    fn list_variables<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, VariableResult<Vec<VariablePath>>>;
}

/// Resolver that dispatches references to providers by name.
///
/// Paths are grouped by provider and the groups are resolved concurrently.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use confix_variables::{LocalVariableProvider, ProviderVariableResolver};
/// use serde_json::json;
///
/// let resolver = ProviderVariableResolver::new()
///     .with_provider(Arc::new(LocalVariableProvider::new("shared", json!({"a": 1}))));
///
/// assert_eq!(resolver.provider_names().collect::<Vec<_>>(), vec!["shared"]);
/// ```
#[derive(Default, Clone)]
pub struct ProviderVariableResolver {
    providers: IndexMap<String, Arc<dyn VariableProvider>>,
}

impl std::fmt::Debug for ProviderVariableResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderVariableResolver")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProviderVariableResolver {
    /// Creates a resolver without providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider, replacing one registered under the same name.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn VariableProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Registers a provider, replacing one registered under the same name.
    pub fn register(&mut self, provider: Arc<dyn VariableProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Names of the registered providers in registration order.
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Builds a resolver from the providers active in the configured
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider's variable file cannot be loaded.
    pub async fn from_config(config: &ConfixConfig) -> VariableResult<Self> {
        let mut resolver = Self::new();
        for provider_config in config.active_providers() {
            let provider = build_provider(config, provider_config).await?;
            tracing::debug!(
                provider = %provider_config.name,
                environment = %config.environment.name,
                "Registered variable provider"
            );
            resolver.register(provider);
        }
        Ok(resolver)
    }

    fn provider(&self, path: &VariablePath) -> VariableResult<&Arc<dyn VariableProvider>> {
        self.providers
            .get(path.provider())
            .ok_or_else(|| VariableError::UnknownProvider {
                provider: path.provider().to_string(),
                path: path.clone(),
            })
    }
}

async fn build_provider(
    config: &ConfixConfig,
    provider_config: &VariableProviderConfig,
) -> VariableResult<Arc<dyn VariableProvider>> {
    match provider_config.kind {
        VariableProviderKind::Local => {
            let provider = match (&provider_config.values, &provider_config.file) {
                (_, Some(file)) => {
                    LocalVariableProvider::from_file(
                        provider_config.name.clone(),
                        &config.resolve_path(file),
                    )
                    .await?
                }
                (Some(values), None) => {
                    LocalVariableProvider::new(provider_config.name.clone(), values.clone())
                }
                (None, None) => LocalVariableProvider::new(
                    provider_config.name.clone(),
                    Value::Object(serde_json::Map::new()),
                ),
            };
            Ok(Arc::new(provider))
        }
    }
}

impl VariableResolver for ProviderVariableResolver {
    fn resolve<'a>(
        &'a self,
        paths: &'a [VariablePath],
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, VariableResult<ResolutionMap>> {
        Box::pin(async move {
            let mut groups: IndexMap<&str, (&Arc<dyn VariableProvider>, Vec<VariablePath>)> =
                IndexMap::new();
            for path in paths {
                if let Some((_, group)) = groups.get_mut(path.provider()) {
                    group.push(path.clone());
                } else {
                    groups.insert(path.provider(), (self.provider(path)?, vec![path.clone()]));
                }
            }

            let mut lookups = Vec::with_capacity(groups.len());
            for (provider, group) in groups.into_values() {
                lookups.push(async move {
                    let resolved = provider.resolve_many(&group).await?;
                    confix_telemetry::record_variables_resolved(provider.name(), resolved.len());
                    Ok::<_, VariableError>(resolved)
                });
            }

            let batches = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(VariableError::Cancelled),
                batches = try_join_all(lookups) => batches?,
            };

            let mut found = ResolutionMap::with_capacity(paths.len());
            for batch in batches {
                found.extend(batch);
            }

            let mut ordered = ResolutionMap::with_capacity(paths.len());
            for path in paths {
                match found.swap_remove(path) {
                    Some(value) => {
                        ordered.insert(path.clone(), value);
                    }
                    None if ordered.contains_key(path) => {}
                    None => return Err(VariableError::Unresolved { path: path.clone() }),
                }
            }
            Ok(ordered)
        })
    }

    fn list_variables<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, VariableResult<Vec<VariablePath>>> {
        Box::pin(async move {
            let listings = try_join_all(self.providers.values().map(|p| p.list()));
            let listings = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(VariableError::Cancelled),
                listings = listings => listings?,
            };
            Ok(listings.into_iter().flatten().collect())
        })
    }
}
