//! Variable providers.
//!
//! A provider owns the values behind one `provider` name in `${provider:path}`.

use std::path::Path;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::path::is_ident;
use crate::{ResolutionMap, VariableError, VariablePath, VariableResult};

/// A source of variable values.
pub trait VariableProvider: Send + Sync {
    /// The provider name references use.
    fn name(&self) -> &str;

    /// Lists every variable the provider can resolve.
    fn list(&self) -> BoxFuture<'_, VariableResult<Vec<VariablePath>>>;

    /// Resolves a batch of references addressed to this provider.
    ///
    /// References the provider has no value for are left out of the map.
    fn resolve_many<'a>(
        &'a self,
        paths: &'a [VariablePath],
    ) -> BoxFuture<'a, VariableResult<ResolutionMap>>;
}

/// A provider backed by a JSON tree held in memory.
///
/// The dotted path of a reference walks object members; numeric segments
/// also index into arrays.
///
/// # Example
///
/// ```
/// use confix_variables::{LocalVariableProvider, VariablePath};
/// use serde_json::json;
///
/// let provider = LocalVariableProvider::new("shared", json!({"db": {"port": 5432}}));
/// assert_eq!(provider.lookup("db.port"), Some(&json!(5432)));
/// assert_eq!(provider.lookup("db.host"), None);
/// ```
#[derive(Debug, Clone)]
pub struct LocalVariableProvider {
    name: String,
    values: Value,
}

impl LocalVariableProvider {
    /// Creates a provider from an in-memory tree.
    pub fn new(name: impl Into<String>, values: Value) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a provider from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `VariableError::Io` if the file cannot be read and
    /// `VariableError::Json` if it is not valid JSON.
    pub async fn from_file(name: impl Into<String>, path: &Path) -> VariableResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| VariableError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let values = serde_json::from_str(&content).map_err(|source| VariableError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(name, values))
    }

    /// Looks up a dotted path.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.values, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    fn collect_leaves(&self, node: &Value, prefix: &mut Vec<String>, out: &mut Vec<VariablePath>) {
        match node {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    // keys outside the grammar cannot be referenced
                    if !is_ident(key) {
                        continue;
                    }
                    prefix.push(key.clone());
                    self.collect_leaves(child, prefix, out);
                    prefix.pop();
                }
            }
            _ => {
                if prefix.is_empty() {
                    return;
                }
                if let Ok(path) = VariablePath::new(self.name.clone(), prefix.join(".")) {
                    out.push(path);
                }
            }
        }
    }
}

impl VariableProvider for LocalVariableProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self) -> BoxFuture<'_, VariableResult<Vec<VariablePath>>> {
        Box::pin(async move {
            let mut out = Vec::new();
            self.collect_leaves(&self.values, &mut Vec::new(), &mut out);
            Ok(out)
        })
    }

    fn resolve_many<'a>(
        &'a self,
        paths: &'a [VariablePath],
    ) -> BoxFuture<'a, VariableResult<ResolutionMap>> {
        Box::pin(async move {
            let resolved = paths
                .iter()
                .filter_map(|p| self.lookup(p.path()).map(|v| (p.clone(), v.clone())))
                .collect();
            Ok(resolved)
        })
    }
}
