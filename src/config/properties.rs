//! Typed views over the merged config domains
//!
//! Keys follow the camelCase names the front-end build reads. Defaults
//! mirror the backend build's standard webapp layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inner build properties (written by the backend build)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerProperties {
    /// Project base directory. Defaults to the parent of the build
    /// working directory, which sits directly under the project root.
    #[serde(default = "default_project_root")]
    pub project_root_path: PathBuf,

    /// Webapp source directory, relative to the project root
    #[serde(default = "default_source_directory")]
    pub source_directory: PathBuf,

    /// Asset directory inside the webapp source directory
    #[serde(default = "default_js_source_directory")]
    pub js_source_directory: PathBuf,

    /// Backend build output directory
    #[serde(default = "default_target_path")]
    pub target_path: PathBuf,

    /// Working directory of the front-end build
    #[serde(default = "default_build_directory")]
    pub grunt_build_directory: PathBuf,

    /// Template-filtered resources that no stage may copy
    #[serde(default)]
    pub filtered_files: Vec<String>,
}

impl Default for InnerProperties {
    fn default() -> Self {
        Self {
            project_root_path: default_project_root(),
            source_directory: default_source_directory(),
            js_source_directory: default_js_source_directory(),
            target_path: default_target_path(),
            grunt_build_directory: default_build_directory(),
            filtered_files: Vec::new(),
        }
    }
}

/// Workflow properties (owned by the front-end project)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowProperties {
    /// Exploded deployment directory name under the backend target
    pub war_name: String,

    /// Distribution directory, relative to the build working root
    #[serde(default = "default_dist_directory")]
    pub dist_directory: PathBuf,

    /// Files moved from the build working root into the dist directory
    #[serde(default = "match_all")]
    pub dist_file_patterns: Vec<String>,

    /// Files moved from the source asset root into the build working root
    #[serde(default = "match_all")]
    pub source_file_patterns: Vec<String>,

    #[serde(default)]
    pub source_exclude_patterns: Vec<String>,

    /// Build tool tasks run between the prepare and dist stages
    #[serde(default)]
    pub build_tasks: Vec<String>,

    /// Build tool tasks run after every watch-triggered resync
    #[serde(default)]
    pub watch_tasks: Vec<String>,

    #[serde(default = "default_build_executable")]
    pub build_executable: String,

    #[serde(default)]
    pub build_options: Vec<String>,

    #[serde(default)]
    pub show_colors: bool,

    /// Accept the build tool's "task failed" exit codes
    #[serde(default)]
    pub ignore_tasks_errors: bool,

    /// Accept every build tool exit code up to and including fatal ones
    #[serde(default)]
    pub ignore_all_errors: bool,

    /// Quiet period collecting a burst of change events, in milliseconds
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

impl WorkflowProperties {
    /// Workflow properties with defaults for everything but the war name
    pub fn new(war_name: impl Into<String>) -> Self {
        Self {
            war_name: war_name.into(),
            dist_directory: default_dist_directory(),
            dist_file_patterns: match_all(),
            source_file_patterns: match_all(),
            source_exclude_patterns: Vec::new(),
            build_tasks: Vec::new(),
            watch_tasks: Vec::new(),
            build_executable: default_build_executable(),
            build_options: Vec::new(),
            show_colors: false,
            ignore_tasks_errors: false,
            ignore_all_errors: false,
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

/// Absolute directories the stages move files between
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandoffLayout {
    pub project_root: PathBuf,
    /// Where the asset sources live
    pub source_root: PathBuf,
    /// Front-end build working directory
    pub build_root: PathBuf,
    /// Front-end build output inside the working directory
    pub dist_root: PathBuf,
    /// Exploded deployment directory the backend build packages
    pub deploy_root: PathBuf,
}

impl HandoffLayout {
    /// Resolve the layout relative to `working_dir`.
    ///
    /// The project root resolves against the working directory; the source
    /// directory and target path resolve against the project root. Absolute
    /// values are taken as they are.
    pub fn resolve(
        working_dir: &Path,
        inner: &InnerProperties,
        workflow: &WorkflowProperties,
    ) -> Self {
        let project_root = working_dir.join(&inner.project_root_path);
        let source_root = project_root
            .join(&inner.source_directory)
            .join(&inner.js_source_directory);
        let build_root = working_dir.join(&inner.grunt_build_directory);
        let dist_root = build_root.join(&workflow.dist_directory);
        let deploy_root = project_root
            .join(&inner.target_path)
            .join(&workflow.war_name)
            .join(&inner.js_source_directory);

        Self {
            project_root,
            source_root,
            build_root,
            dist_root,
            deploy_root,
        }
    }
}

fn default_project_root() -> PathBuf {
    PathBuf::from("..")
}

fn default_source_directory() -> PathBuf {
    PathBuf::from("src/main/webapp")
}

fn default_js_source_directory() -> PathBuf {
    PathBuf::from("static")
}

fn default_target_path() -> PathBuf {
    PathBuf::from("target")
}

fn default_build_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_dist_directory() -> PathBuf {
    PathBuf::from("dist")
}

fn default_build_executable() -> String {
    "grunt".to_string()
}

fn default_watch_debounce_ms() -> u64 {
    100
}

fn match_all() -> Vec<String> {
    vec!["**".to_string()]
}
