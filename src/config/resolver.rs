//! Layered configuration resolution
//!
//! A config domain is a pair of JSON files: a mandatory base layer and an
//! optional override layer. Resolution reads both once and hands back an
//! immutable [`MergedConfig`] that records which layers contributed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::merge::{merge_shallow, ConfigLayer};

/// Base file of the inner build properties domain
pub const INNER_PROPERTIES_FILE: &str = "maven-tasks/maven-inner-properties.json";

/// Override file of the inner build properties domain
pub const INNER_OVERRIDE_FILE: &str = "maven-tasks/maven-custom-inner-properties.json";

/// Base file of the workflow properties domain
pub const WORKFLOW_PROPERTIES_FILE: &str = "maven-workflow-properties.json";

/// Override file of the workflow properties domain
pub const WORKFLOW_OVERRIDE_FILE: &str = "maven-custom-workflow-properties.json";

/// Which layer a value set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerOrigin {
    Base,
    Override,
}

/// A layer that contributed to a merged config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSource {
    pub origin: LayerOrigin,
    pub path: PathBuf,
}

/// The (base, override) file pair of one config domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFiles {
    pub base: PathBuf,
    pub overlay: PathBuf,
}

impl LayerFiles {
    pub fn new(base: impl Into<PathBuf>, overlay: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            overlay: overlay.into(),
        }
    }

    /// Default inner-properties pair under `root`
    pub fn inner_properties(root: &Path) -> Self {
        Self::new(root.join(INNER_PROPERTIES_FILE), root.join(INNER_OVERRIDE_FILE))
    }

    /// Default workflow-properties pair under `root`
    pub fn workflow_properties(root: &Path) -> Self {
        Self::new(
            root.join(WORKFLOW_PROPERTIES_FILE),
            root.join(WORKFLOW_OVERRIDE_FILE),
        )
    }

    /// Resolve this pair
    pub fn resolve(&self) -> Result<MergedConfig, ConfigError> {
        resolve(&self.base, &self.overlay)
    }
}

/// Result of layering an override over a base config
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedConfig {
    config: ConfigLayer,
    sources: Vec<LayerSource>,
}

impl MergedConfig {
    /// Wrap an in-memory layer (no file provenance)
    pub fn from_layer(config: ConfigLayer) -> Self {
        Self {
            config,
            sources: Vec::new(),
        }
    }

    pub fn values(&self) -> &ConfigLayer {
        &self.config
    }

    /// Layers that contributed, in precedence order
    pub fn sources(&self) -> &[LayerSource] {
        &self.sources
    }

    /// Whether an override layer was applied
    pub fn has_override(&self) -> bool {
        self.sources
            .iter()
            .any(|s| s.origin == LayerOrigin::Override)
    }

    /// Deserialize a typed view of the merged values
    pub fn view<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(Value::Object(self.config.clone())).map_err(|source| {
            ConfigError::Invalid {
                origin: self.describe_origin(),
                source,
            }
        })
    }

    fn describe_origin(&self) -> String {
        if self.sources.is_empty() {
            return "<in-memory>".to_string();
        }
        self.sources
            .iter()
            .map(|s| s.path.display().to_string())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// Resolve a base layer and an optional override layer.
///
/// The base must exist and hold a JSON object. A missing override falls
/// back to the base unchanged; an override that exists but does not parse
/// is an error.
pub fn resolve(base_path: &Path, override_path: &Path) -> Result<MergedConfig, ConfigError> {
    let base = load_layer(base_path)?;
    let mut sources = vec![LayerSource {
        origin: LayerOrigin::Base,
        path: base_path.to_path_buf(),
    }];

    let config = match load_optional_layer(override_path)? {
        Some(overlay) => {
            debug!(path = %override_path.display(), keys = overlay.len(), "applying override layer");
            sources.push(LayerSource {
                origin: LayerOrigin::Override,
                path: override_path.to_path_buf(),
            });
            merge_shallow(base, overlay)
        }
        None => {
            debug!(path = %override_path.display(), "no override layer");
            base
        }
    };

    Ok(MergedConfig { config, sources })
}

/// Load a mandatory layer
pub fn load_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layer(path, &contents)
}

/// Load a layer that may be absent
fn load_optional_layer(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_layer(path, &contents).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_layer(path: &Path, contents: &str) -> Result<ConfigLayer, ConfigError> {
    let value: Value = serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Configuration load errors. All of them abort a workflow before any
/// stage runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config {path} is not a JSON object")]
    NotAnObject { path: PathBuf },

    #[error("invalid configuration in {origin}: {source}")]
    Invalid {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_override_applied() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.json", r#"{"a": 1, "b": 2}"#);
        let overlay = write(&dir, "custom.json", r#"{"b": 3, "c": 4}"#);

        let merged = resolve(&base, &overlay).unwrap();

        assert_eq!(
            Value::Object(merged.values().clone()),
            json!({"a": 1, "b": 3, "c": 4})
        );
        assert!(merged.has_override());
        assert_eq!(merged.sources().len(), 2);
    }

    #[test]
    fn test_missing_override_returns_base() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.json", r#"{"a": 1, "list": ["x"]}"#);

        let merged = resolve(&base, &dir.path().join("absent.json")).unwrap();

        assert_eq!(merged.values(), &load_layer(&base).unwrap());
        assert!(!merged.has_override());
        assert_eq!(merged.sources()[0].origin, LayerOrigin::Base);
    }

    #[test]
    fn test_missing_base_fails() {
        let dir = TempDir::new().unwrap();

        let err = resolve(&dir.path().join("nope.json"), &dir.path().join("x.json")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_malformed_base_fails() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.json", "{ not json");

        let err = resolve(&base, &dir.path().join("x.json")).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_non_object_base_fails() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.json", "[1, 2, 3]");

        let err = resolve(&base, &dir.path().join("x.json")).unwrap_err();

        assert!(matches!(err, ConfigError::NotAnObject { .. }));
    }

    #[test]
    fn test_malformed_override_fails() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.json", r#"{"a": 1}"#);
        let overlay = write(&dir, "custom.json", "{");

        let err = resolve(&base, &overlay).unwrap_err();

        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, overlay),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_file_pairs() {
        let root = Path::new("/work");

        let inner = LayerFiles::inner_properties(root);
        let workflow = LayerFiles::workflow_properties(root);

        assert_eq!(inner.base, root.join("maven-tasks/maven-inner-properties.json"));
        assert_eq!(
            workflow.overlay,
            root.join("maven-custom-workflow-properties.json")
        );
    }

    #[test]
    fn test_view_reports_invalid_values() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Needs {
            count: u32,
        }

        let merged = MergedConfig::from_layer(
            json!({"count": "three"}).as_object().unwrap().clone(),
        );

        let err = merged.view::<Needs>().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
