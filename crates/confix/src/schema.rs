//! Schema composition and storage.

use std::path::PathBuf;

use confix_core::{
    Component, ConfixError, ConfixResult, ProjectDefinition, SchemaFile, SolutionDefinition,
};
use confix_middleware::BoxFuture;
use confix_variables::VariablePath;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

/// JSON schema dialect of composed schemas.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Directory, relative to the solution, composed schemas are stored in.
pub const SCHEMA_DIRECTORY: &str = ".confix/schemas";

/// Builds the schema of a project from its components.
pub trait ProjectComposer: Send + Sync {
    /// Composes `components` into one schema. `variables` are the references
    /// a configuration value may use instead of a literal.
    fn compose(&self, components: &[Component], variables: &[VariablePath]) -> Value;
}

/// Object schema with one property per component.
///
/// Every property accepts the component's schema or a known variable
/// reference:
///
/// ```json
/// {
///   "type": "object",
///   "properties": {
///     "Database": { "anyOf": [ { ... }, { "$ref": "#/$defs/variables" } ] }
///   },
///   "$defs": { "variables": { "type": "string", "enum": ["${secrets:db.password}"] } }
/// }
/// ```
///
/// Components with the same name replace earlier ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProjectComposer;

impl ProjectComposer for DefaultProjectComposer {
    fn compose(&self, components: &[Component], variables: &[VariablePath]) -> Value {
        let mut properties = Map::new();
        for component in components {
            properties.insert(
                component.component_name.clone(),
                json!({
                    "anyOf": [component.schema, {"$ref": "#/$defs/variables"}]
                }),
            );
        }

        let references: Vec<Value> = variables
            .iter()
            .map(|v| Value::String(v.to_string()))
            .collect();

        json!({
            "$schema": SCHEMA_DIALECT,
            "type": "object",
            "properties": properties,
            "$defs": {
                "variables": {
                    "type": "string",
                    "enum": references,
                }
            }
        })
    }
}

/// Persists composed schemas.
pub trait SchemaStore: Send + Sync {
    /// Stores `schema` for `project`, returning where it was written.
    fn store<'a>(
        &'a self,
        solution: &'a SolutionDefinition,
        project: &'a ProjectDefinition,
        schema: &'a Value,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ConfixResult<SchemaFile>>;
}

/// Writes schemas to `<solution>/.confix/schemas/<project>.schema.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSchemaStore;

impl FileSchemaStore {
    /// Path the schema of `project` is stored at.
    #[must_use]
    pub fn schema_path(solution: &SolutionDefinition, project: &ProjectDefinition) -> PathBuf {
        solution
            .directory
            .join(SCHEMA_DIRECTORY)
            .join(format!("{}.schema.json", project.name))
    }
}

impl SchemaStore for FileSchemaStore {
    fn store<'a>(
        &'a self,
        solution: &'a SolutionDefinition,
        project: &'a ProjectDefinition,
        schema: &'a Value,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ConfixResult<SchemaFile>> {
        Box::pin(async move {
            let path = Self::schema_path(solution, project);
            let content = serde_json::to_string_pretty(schema)?;

            if cancel.is_cancelled() {
                return Err(ConfixError::Cancelled);
            }

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ConfixError::io(parent, e))?;
            }
            tokio::fs::write(&path, content)
                .await
                .map_err(|e| ConfixError::io(&path, e))?;

            tracing::debug!(path = %path.display(), "Stored schema");
            Ok(SchemaFile { path })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, schema: Value) -> Component {
        Component::new("inline", name, schema)
    }

    #[test]
    fn test_compose_properties_per_component() {
        let schema = DefaultProjectComposer.compose(
            &[
                component("Database", json!({"type": "object"})),
                component("Logging", json!({"type": "string"})),
            ],
            &[],
        );

        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["properties"]["Database"]["anyOf"][0],
            json!({"type": "object"})
        );
        assert_eq!(
            schema["properties"]["Logging"]["anyOf"][1],
            json!({"$ref": "#/$defs/variables"})
        );
    }

    #[test]
    fn test_compose_lists_variables() {
        let variables = vec![
            VariablePath::new("secrets", "db.password").unwrap(),
            VariablePath::new("var", "region").unwrap(),
        ];

        let schema = DefaultProjectComposer.compose(&[], &variables);

        assert_eq!(
            schema["$defs"]["variables"]["enum"],
            json!(["${secrets:db.password}", "${var:region}"])
        );
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn test_compose_later_component_replaces_earlier() {
        let schema = DefaultProjectComposer.compose(
            &[
                component("Database", json!({"type": "object"})),
                component("Database", json!({"type": "array"})),
            ],
            &[],
        );

        assert_eq!(
            schema["properties"]["Database"]["anyOf"][0],
            json!({"type": "array"})
        );
    }

    #[tokio::test]
    async fn test_file_store_writes_schema() {
        let dir = tempfile::tempdir().unwrap();
        let solution = SolutionDefinition::new(dir.path());
        let project = ProjectDefinition::new("api", dir.path().join("api"));
        let schema = json!({"type": "object"});

        let file = FileSchemaStore
            .store(&solution, &project, &schema, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            file.path,
            dir.path().join(".confix/schemas/api.schema.json")
        );
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&file.path).unwrap()).unwrap();
        assert_eq!(written, schema);
    }

    #[tokio::test]
    async fn test_file_store_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let solution = SolutionDefinition::new(dir.path());
        let project = ProjectDefinition::new("api", dir.path());
        let token = CancellationToken::new();
        token.cancel();

        let err = FileSchemaStore
            .store(&solution, &project, &json!({}), &token)
            .await
            .unwrap_err();

        assert!(err.is_cancellation());
        assert!(!FileSchemaStore::schema_path(&solution, &project).exists());
    }
}
