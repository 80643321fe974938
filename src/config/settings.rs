//! Run-wide resolved configuration

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::properties::{HandoffLayout, InnerProperties, WorkflowProperties};
use super::resolver::{ConfigError, LayerFiles, MergedConfig};

/// Everything a workflow run needs to know, resolved once at start.
#[derive(Debug, Clone, Serialize)]
pub struct HandoffConfig {
    /// Directory relative paths were resolved against
    pub working_dir: PathBuf,
    /// Merged inner build properties, with provenance
    pub inner: MergedConfig,
    /// Merged workflow properties, with provenance
    pub workflow: MergedConfig,
    pub inner_properties: InnerProperties,
    pub workflow_properties: WorkflowProperties,
    pub layout: HandoffLayout,
}

impl HandoffConfig {
    /// Resolve both config domains and derive the directory layout.
    pub fn load(
        working_dir: &Path,
        inner_files: &LayerFiles,
        workflow_files: &LayerFiles,
    ) -> Result<Self, ConfigError> {
        let inner = inner_files.resolve()?;
        let workflow = workflow_files.resolve()?;

        let config = Self::from_merged(working_dir, inner, workflow)?;
        info!(
            source = %config.layout.source_root.display(),
            build = %config.layout.build_root.display(),
            deploy = %config.layout.deploy_root.display(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Build from already-merged domains
    pub fn from_merged(
        working_dir: &Path,
        inner: MergedConfig,
        workflow: MergedConfig,
    ) -> Result<Self, ConfigError> {
        let inner_properties: InnerProperties = inner.view()?;
        let workflow_properties: WorkflowProperties = workflow.view()?;
        let layout = HandoffLayout::resolve(working_dir, &inner_properties, &workflow_properties);

        Ok(Self {
            working_dir: working_dir.to_path_buf(),
            inner,
            workflow,
            inner_properties,
            workflow_properties,
            layout,
        })
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_with_overrides() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("maven-tasks")).unwrap();
        fs::write(
            dir.path().join("maven-tasks/maven-inner-properties.json"),
            json!({"projectRootPath": "/srv/shop", "filteredFiles": ["a.html"]}).to_string(),
        )
        .unwrap();
        fs::write(
            dir.path().join("maven-workflow-properties.json"),
            json!({"warName": "shop"}).to_string(),
        )
        .unwrap();
        fs::write(
            dir.path().join("maven-custom-workflow-properties.json"),
            json!({"warName": "shop-dev"}).to_string(),
        )
        .unwrap();

        let config = HandoffConfig::load(
            dir.path(),
            &LayerFiles::inner_properties(dir.path()),
            &LayerFiles::workflow_properties(dir.path()),
        )
        .unwrap();

        assert_eq!(config.workflow_properties.war_name, "shop-dev");
        assert!(config.workflow.has_override());
        assert!(!config.inner.has_override());
        assert_eq!(
            config.layout.deploy_root,
            PathBuf::from("/srv/shop/target/shop-dev/static")
        );
    }

    #[test]
    fn test_missing_war_name_is_config_error() {
        let inner = MergedConfig::from_layer(Default::default());
        let workflow = MergedConfig::from_layer(Default::default());

        let err = HandoffConfig::from_merged(Path::new("/w"), inner, workflow).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("warName"));
    }
}
