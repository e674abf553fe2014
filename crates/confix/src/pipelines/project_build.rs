//! `project build`: write variable-free copies of the configuration files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use confix_core::{ConfixError, ConfixResult};
use confix_middleware::{BoxFuture, FeatureKey, Handler, MiddlewareContext, Pipeline};

use super::{common_stages, PipelineOptions};
use crate::features::{
    BuildOutputFeature, ConfigurationFeature, ConfigurationFile, ConfigurationFileFeature,
    VariableReplacerFeature,
};

/// Pipeline name used in logs and metrics.
pub const PROJECT_BUILD: &str = "project_build";

/// Builds the `project build` pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ProjectBuildPipeline;

impl ProjectBuildPipeline {
    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ConfixError::Configuration` if the pipeline is miswired.
    pub fn build(options: PipelineOptions) -> ConfixResult<Pipeline> {
        common_stages(PROJECT_BUILD, &options)
            .use_handler(ProjectBuildHandler)
            .build()
    }
}

/// Terminal step of `project build`.
///
/// Every configuration file is rewritten with its variable references
/// resolved and written as pretty JSON below the project's output directory,
/// keeping its path relative to the project. Written paths are recorded in
/// [`BuildOutputFeature`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectBuildHandler;

impl ProjectBuildHandler {
    async fn build(ctx: &mut MiddlewareContext) -> ConfixResult<()> {
        ctx.set_status("Building the configuration files...");

        let configuration = ctx.features().get::<ConfigurationFeature>()?;
        let project = configuration.ensure_project()?;
        let output_dir = project.directory.join(&configuration.config.project.output_dir);
        let files = ctx.features().get::<ConfigurationFileFeature>()?.files.clone();
        let replacer = ctx
            .features()
            .get::<VariableReplacerFeature>()?
            .replacer
            .clone();

        let targets = output_paths(&output_dir, &files)?;

        let mut written = Vec::with_capacity(files.len());
        for (file, target) in files.iter().zip(targets) {
            let content = replacer.rewrite(&file.content, ctx.cancellation()).await?;

            ctx.ensure_not_cancelled()?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ConfixError::io(parent, e))?;
            }
            tokio::fs::write(&target, serde_json::to_string_pretty(&content)?)
                .await
                .map_err(|e| ConfixError::io(&target, e))?;

            ctx.logger()
                .information(format!("-  {}", file.relative_path.display()));
            written.push(target);
        }

        ctx.logger().success(format!(
            "Built {} configuration file(s) for project {}",
            written.len(),
            project.name
        ));
        ctx.features_mut().set(BuildOutputFeature { files: written });
        Ok(())
    }
}

impl Handler for ProjectBuildHandler {
    fn required_features(&self) -> Vec<FeatureKey> {
        vec![
            FeatureKey::of::<ConfigurationFeature>(),
            FeatureKey::of::<ConfigurationFileFeature>(),
            FeatureKey::of::<VariableReplacerFeature>(),
        ]
    }

    fn handle<'a>(&'a self, ctx: &'a mut MiddlewareContext) -> BoxFuture<'a, ConfixResult<()>> {
        Box::pin(Self::build(ctx))
    }
}

/// Output location of a configuration file. Documents are always written as
/// JSON, so the extension becomes `.json`.
fn output_path(output_dir: &Path, relative: &Path) -> PathBuf {
    output_dir.join(relative).with_extension("json")
}

/// Output locations of all files, in order. Two sources may not share one
/// output, as `a.toml` and `a.json` would.
fn output_paths(output_dir: &Path, files: &[ConfigurationFile]) -> ConfixResult<Vec<PathBuf>> {
    let mut sources: HashMap<PathBuf, &Path> = HashMap::with_capacity(files.len());
    let mut targets = Vec::with_capacity(files.len());

    for file in files {
        let target = output_path(output_dir, &file.relative_path);
        if let Some(previous) = sources.insert(target.clone(), &file.relative_path) {
            return Err(ConfixError::configuration(format!(
                "configuration files '{}' and '{}' would both be built to {}",
                previous.display(),
                file.relative_path.display(),
                target.display()
            )));
        }
        targets.push(target);
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(relative: &str) -> ConfigurationFile {
        ConfigurationFile {
            path: Path::new("/repo/api").join(relative),
            relative_path: PathBuf::from(relative),
            content: json!({}),
        }
    }

    #[test]
    fn test_output_path_keeps_relative_location() {
        assert_eq!(
            output_path(Path::new("/repo/api/.confix/build"), Path::new("config/appsettings.json")),
            PathBuf::from("/repo/api/.confix/build/config/appsettings.json")
        );
    }

    #[test]
    fn test_output_path_converts_toml() {
        assert_eq!(
            output_path(Path::new("/out"), Path::new("extra.toml")),
            PathBuf::from("/out/extra.json")
        );
    }

    #[test]
    fn test_output_paths_in_file_order() {
        let targets =
            output_paths(Path::new("/out"), &[file("b.json"), file("config/a.toml")]).unwrap();
        assert_eq!(
            targets,
            vec![PathBuf::from("/out/b.json"), PathBuf::from("/out/config/a.json")]
        );
    }

    #[test]
    fn test_output_paths_reject_shared_target() {
        let err = output_paths(Path::new("/out"), &[file("a.toml"), file("a.json")]).unwrap_err();
        assert!(matches!(err, ConfixError::Configuration { .. }));
        assert!(err.to_string().contains("a.toml"));
        assert!(err.to_string().contains("a.json"));
    }
}
