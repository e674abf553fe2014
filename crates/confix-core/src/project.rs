//! Project, solution and component records.
//!
//! These are plain data carried between pipeline stages and handed to the
//! component provider, the schema composer and the schema store.

use serde::{Deserialize, Serialize};
use std::path::{Component as PathComponent, Path, PathBuf};

/// A project whose configuration schema is being composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDefinition {
    /// Project name, used to name the stored schema.
    pub name: String,
    /// Absolute directory of the project.
    pub directory: PathBuf,
}

impl ProjectDefinition {
    /// Creates a project definition.
    #[must_use]
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
        }
    }
}

/// The solution (repository root) a project belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionDefinition {
    /// Absolute directory of the solution.
    pub directory: PathBuf,
}

impl SolutionDefinition {
    /// Creates a solution definition.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

/// A component loaded by a component provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Name of the provider that produced the component.
    pub provider: String,
    /// Component name, unique within its provider.
    pub component_name: String,
    /// JSON schema contributed by the component.
    pub schema: serde_json::Value,
}

impl Component {
    /// Creates a component.
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        component_name: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            provider: provider.into(),
            component_name: component_name.into(),
            schema,
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}/{}", self.provider, self.component_name)
    }
}

/// Handle to a stored schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Where the schema was written.
    pub path: PathBuf,
}

/// The artifact produced by a schema reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSchemaDefinition {
    /// The project the schema was composed for.
    pub project: ProjectDefinition,
    /// The solution root.
    pub solution: PathBuf,
    /// Configuration files, relative to the solution root, whose change
    /// invalidates the schema.
    pub file_match: Vec<PathBuf>,
    /// The stored schema.
    pub schema_file: SchemaFile,
    /// Project directory relative to the solution root.
    pub relative_path_to_project: PathBuf,
}

/// Computes `path` relative to `base`.
///
/// Both paths are expected to be absolute (or both relative to the same
/// root). Walks up from `base` with `..` where the paths diverge.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use confix_core::relative_path;
///
/// let rel = relative_path(Path::new("/repo/src/app/appsettings.json"), Path::new("/repo"));
/// assert_eq!(rel, Path::new("src/app/appsettings.json"));
///
/// let up = relative_path(Path::new("/repo/shared"), Path::new("/repo/src/app"));
/// assert_eq!(up, Path::new("../../shared"));
/// ```
#[must_use]
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<PathComponent<'_>> = path
        .components()
        .filter(|c| !matches!(c, PathComponent::CurDir))
        .collect();
    let base: Vec<PathComponent<'_>> = base
        .components()
        .filter(|c| !matches!(c, PathComponent::CurDir))
        .collect();

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base.len() {
        result.push("..");
    }
    for component in &path[common..] {
        result.push(component.as_os_str());
    }

    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}
