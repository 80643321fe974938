//! Shared fixtures for integration tests

#![allow(dead_code)]

use asset_handoff::config::{HandoffConfig, LayerFiles};
use asset_handoff::tasks::{TaskError, TaskRunner};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A project tree with a build working directory under `target-grunt`
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(project.build_root()).unwrap();
        project.write_inner(json!({
            "projectRootPath": project.root(),
            "gruntBuildDirectory": project.build_root(),
            "filteredFiles": []
        }));
        project.write_workflow(json!({
            "warName": "shop",
            "buildTasks": ["less", "uglify"],
            "watchTasks": ["less"]
        }));
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn source_root(&self) -> PathBuf {
        self.root().join("src/main/webapp/static")
    }

    pub fn build_root(&self) -> PathBuf {
        self.root().join("target-grunt")
    }

    pub fn dist_root(&self) -> PathBuf {
        self.build_root().join("dist")
    }

    pub fn deploy_root(&self) -> PathBuf {
        self.root().join("target/shop/static")
    }

    pub fn inner_files(&self) -> LayerFiles {
        LayerFiles::inner_properties(&self.build_root())
    }

    pub fn workflow_files(&self) -> LayerFiles {
        LayerFiles::workflow_properties(&self.build_root())
    }

    pub fn write_inner(&self, value: Value) {
        write_json(&self.inner_files().base, &value);
    }

    pub fn write_inner_override(&self, value: Value) {
        write_json(&self.inner_files().overlay, &value);
    }

    pub fn write_workflow(&self, value: Value) {
        write_json(&self.workflow_files().base, &value);
    }

    pub fn write_workflow_override(&self, value: Value) {
        write_json(&self.workflow_files().overlay, &value);
    }

    pub fn write_source(&self, relative: &str, contents: &str) {
        write_file(&self.source_root().join(relative), contents);
    }

    pub fn config(&self) -> HandoffConfig {
        HandoffConfig::load(&self.build_root(), &self.inner_files(), &self.workflow_files())
            .unwrap()
    }
}

pub fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

pub fn write_json(path: &Path, value: &Value) {
    write_file(path, &serde_json::to_string_pretty(value).unwrap());
}

/// Records every task it is asked to run; fails the named one
#[derive(Clone, Default)]
pub struct RecordingRunner {
    pub log: Arc<Mutex<Vec<String>>>,
    pub fail: Option<String>,
}

impl RecordingRunner {
    pub fn failing(task: &str) -> Self {
        Self {
            fail: Some(task.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl TaskRunner for RecordingRunner {
    fn run_task(&mut self, task: &str) -> Result<(), TaskError> {
        self.log.lock().unwrap().push(task.to_string());
        if self.fail.as_deref() == Some(task) {
            return Err(TaskError::Failed {
                task: task.to_string(),
                code: Some(3),
            });
        }
        Ok(())
    }
}

/// Relative paths of every file under `root`, sorted
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }

    let mut files = Vec::new();
    if root.is_dir() {
        walk(root, root, &mut files);
    }
    files.sort();
    files
}
