//! Scan, resolve and rewrite in one call.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{rewrite, scan, VariableError, VariablePath, VariableResolver, VariableResult};

/// Materializes the variable references of a document.
///
/// The resolver is called once per document with the deduplicated set of
/// references.
#[derive(Clone)]
pub struct VariableReplacer {
    resolver: Arc<dyn VariableResolver>,
}

impl std::fmt::Debug for VariableReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableReplacer").finish_non_exhaustive()
    }
}

impl VariableReplacer {
    /// Creates a replacer over `resolver`.
    pub fn new(resolver: Arc<dyn VariableResolver>) -> Self {
        Self { resolver }
    }

    /// The resolver references are sent to.
    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn VariableResolver> {
        &self.resolver
    }

    /// Returns a copy of `value` with every reference replaced.
    ///
    /// # Errors
    ///
    /// Returns `VariableError::Cancelled` if `cancel` fires before the
    /// resolver returns, otherwise any error of the resolver or the rewrite.
    pub async fn rewrite(&self, value: &Value, cancel: &CancellationToken) -> VariableResult<Value> {
        if cancel.is_cancelled() {
            return Err(VariableError::Cancelled);
        }

        let scanned = scan(value);
        if scanned.is_empty() {
            return Ok(value.clone());
        }

        debug!(
            occurrences = scanned.occurrences().len(),
            distinct = scanned.distinct().len(),
            "Resolving variables"
        );

        let paths: Vec<VariablePath> = scanned.distinct().iter().cloned().collect();
        let resolved = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(VariableError::Cancelled),
            resolved = self.resolver.resolve(&paths, cancel) => resolved?,
        };

        rewrite(value, &scanned, &resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalVariableProvider, ProviderVariableResolver};
    use serde_json::json;

    fn replacer() -> VariableReplacer {
        let resolver = ProviderVariableResolver::new().with_provider(Arc::new(
            LocalVariableProvider::new("var", json!({"x": "VALUE"})),
        ));
        VariableReplacer::new(Arc::new(resolver))
    }

    #[tokio::test]
    async fn test_rewrite_document() {
        let doc = json!({"a": "${var:x}", "b": 5});
        let out = replacer()
            .rewrite(&doc, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, json!({"a": "VALUE", "b": 5}));
    }

    #[tokio::test]
    async fn test_rewrite_without_references() {
        let doc = json!({"a": "plain", "b": [1, 2]});
        let out = replacer()
            .rewrite(&doc, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, doc);
    }

    #[tokio::test]
    async fn test_rewrite_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = replacer().rewrite(&json!({"a": "${var:x}"}), &cancel).await;
        assert!(matches!(result, Err(VariableError::Cancelled)));
    }
}
