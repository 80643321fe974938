//! Build working directory scaffolding
//!
//! The backend build prepares the front-end working directory before any
//! workflow runs: it writes the inner build properties the workflows read,
//! and removes the whole directory on clean.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::INNER_PROPERTIES_FILE;

/// Backend build parameters exported to the front-end build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceParams {
    pub project_root: PathBuf,
    pub source_directory: PathBuf,
    pub js_source_directory: PathBuf,
    pub target_path: PathBuf,
    pub build_directory: PathBuf,
    pub filtered_files: Vec<String>,
}

impl ResourceParams {
    /// Make the project root and build directory absolute against `base`.
    /// The workflows resolve relative values against the build directory.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        self.project_root = absolute(base, &self.project_root);
        self.build_directory = absolute(base, &self.build_directory);
        self
    }

    /// Absolute directory the watch workflow observes
    pub fn directory_to_watch(&self) -> PathBuf {
        self.project_root
            .join(&self.source_directory)
            .join(&self.js_source_directory)
    }

    /// Where the inner properties file is written
    pub fn inner_properties_path(&self) -> PathBuf {
        self.build_directory.join(INNER_PROPERTIES_FILE)
    }

    /// Render the inner properties layer
    pub fn to_layer(&self) -> Map<String, Value> {
        let directory_to_watch = forward_slashes(&self.directory_to_watch());

        let mut layer = Map::new();
        layer.insert(
            "filesToWatch".into(),
            Value::String(format!("{}/**", directory_to_watch)),
        );
        layer.insert("directoryToWatch".into(), Value::String(directory_to_watch));
        layer.insert(
            "projectRootPath".into(),
            Value::String(forward_slashes(&self.project_root)),
        );
        layer.insert(
            "targetPath".into(),
            Value::String(forward_slashes(&self.target_path)),
        );
        layer.insert(
            "sourceDirectory".into(),
            Value::String(forward_slashes(&self.source_directory)),
        );
        layer.insert(
            "jsSourceDirectory".into(),
            Value::String(forward_slashes(&self.js_source_directory)),
        );
        layer.insert(
            "gruntBuildDirectory".into(),
            Value::String(forward_slashes(&self.build_directory)),
        );
        layer.insert(
            "filteredFiles".into(),
            Value::Array(
                self.filtered_files
                    .iter()
                    .map(|f| Value::String(f.replace('\\', "/")))
                    .collect(),
            ),
        );
        layer
    }
}

/// Resource scaffolding errors
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("refusing to remove {path}: it contains the project root or is a filesystem root")]
    UnsafeClean { path: PathBuf },
}

/// Write the inner properties file, always overwriting.
///
/// Returns the path written.
pub fn create_resources(params: &ResourceParams) -> Result<PathBuf, ResourceError> {
    let path = params.inner_properties_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ResourceError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(&Value::Object(params.to_layer()))?;
    fs::write(&path, json).map_err(|source| ResourceError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "inner properties written");
    Ok(path)
}

/// Remove the build working directory.
///
/// Returns `false` if there was nothing to remove.
pub fn clean(build_directory: &Path, project_root: &Path) -> Result<bool, ResourceError> {
    if !build_directory.exists() {
        info!(path = %build_directory.display(), "nothing to clean");
        return Ok(false);
    }

    let build = canonical(build_directory);
    let project = canonical(project_root);
    if build.parent().is_none() || project.starts_with(&build) {
        return Err(ResourceError::UnsafeClean {
            path: build_directory.to_path_buf(),
        });
    }

    fs::remove_dir_all(build_directory).map_err(|source| ResourceError::Remove {
        path: build_directory.to_path_buf(),
        source,
    })?;
    info!(path = %build_directory.display(), "build directory removed");
    Ok(true)
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    base.join(path).components().collect()
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_layer, InnerProperties};
    use tempfile::TempDir;

    fn params(root: &Path) -> ResourceParams {
        ResourceParams {
            project_root: root.to_path_buf(),
            source_directory: PathBuf::from("src/main/webapp"),
            js_source_directory: PathBuf::from("static"),
            target_path: root.join("target"),
            build_directory: root.join("target-grunt"),
            filtered_files: vec!["index.html".to_string(), "cfg\\env.js".to_string()],
        }
    }

    #[test]
    fn test_create_resources_writes_readable_layer() {
        let dir = TempDir::new().unwrap();
        let params = params(dir.path());

        let path = create_resources(&params).unwrap();

        assert_eq!(
            path,
            dir.path().join("target-grunt/maven-tasks/maven-inner-properties.json")
        );
        let layer = load_layer(&path).unwrap();
        let inner: InnerProperties =
            serde_json::from_value(Value::Object(layer.clone())).unwrap();
        assert_eq!(inner.filtered_files, vec!["index.html", "cfg/env.js"]);
        assert_eq!(inner.js_source_directory, PathBuf::from("static"));
        assert!(layer["filesToWatch"]
            .as_str()
            .unwrap()
            .ends_with("src/main/webapp/static/**"));
    }

    #[test]
    fn test_create_resources_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut params = params(dir.path());
        create_resources(&params).unwrap();

        params.filtered_files.clear();
        let path = create_resources(&params).unwrap();

        let layer = load_layer(&path).unwrap();
        assert_eq!(layer["filteredFiles"], Value::Array(vec![]));
    }

    #[test]
    fn test_resolved_against_makes_paths_absolute() {
        let params = ResourceParams {
            project_root: PathBuf::from("."),
            build_directory: PathBuf::from("target-grunt"),
            ..params(Path::new("/unused"))
        }
        .resolved_against(Path::new("/srv/shop"));

        assert_eq!(params.project_root, PathBuf::from("/srv/shop"));
        assert_eq!(params.build_directory, PathBuf::from("/srv/shop/target-grunt"));
        assert_eq!(
            params.inner_properties_path(),
            PathBuf::from("/srv/shop/target-grunt/maven-tasks/maven-inner-properties.json")
        );
        assert_eq!(params.target_path, PathBuf::from("/unused/target"));
    }

    #[test]
    fn test_clean_removes_build_directory() {
        let dir = TempDir::new().unwrap();
        let build = dir.path().join("target-grunt");
        fs::create_dir_all(build.join("dist")).unwrap();
        fs::write(build.join("dist/app.js"), "x").unwrap();

        assert!(clean(&build, dir.path()).unwrap());
        assert!(!build.exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_clean_missing_directory_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(!clean(&dir.path().join("absent"), dir.path()).unwrap());
    }

    #[test]
    fn test_clean_refuses_project_root() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("shop");
        fs::create_dir_all(&project).unwrap();

        let err = clean(dir.path(), &project).unwrap_err();

        assert!(matches!(err, ResourceError::UnsafeClean { .. }));
        assert!(project.exists());
    }
}
