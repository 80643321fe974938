//! Sync stages
//!
//! A stage pairs a source root, a destination root and a compiled pattern
//! set. Stages are built fresh from the resolved config every time they run.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use handoff_copy::{copy_tree, CopyError, PatternSet};

use crate::config::{HandoffConfig, WORKFLOW_OVERRIDE_FILE, WORKFLOW_PROPERTIES_FILE};
use crate::patterns::compile;

/// The three directory hand-offs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// Source asset root to build working root
    Prepare,
    /// Build working root to dist directory
    Dist,
    /// Dist directory to deployment target
    Deploy,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Prepare => "prepare",
            StageKind::Dist => "dist",
            StageKind::Deploy => "deploy",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source-root to destination-root copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStage {
    kind: StageKind,
    source: PathBuf,
    destination: PathBuf,
    patterns: PatternSet,
}

impl SyncStage {
    pub fn new(
        kind: StageKind,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        patterns: PatternSet,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            destination: destination.into(),
            patterns,
        }
    }

    /// Build the descriptor for `kind` from the resolved config
    pub fn for_kind(kind: StageKind, config: &HandoffConfig) -> Self {
        match kind {
            StageKind::Prepare => Self::prepare(config),
            StageKind::Dist => Self::dist(config),
            StageKind::Deploy => Self::deploy(config),
        }
    }

    /// Source asset root into the build working root
    pub fn prepare(config: &HandoffConfig) -> Self {
        let workflow = &config.workflow_properties;
        Self::new(
            StageKind::Prepare,
            &config.layout.source_root,
            &config.layout.build_root,
            compile(
                &workflow.source_file_patterns,
                &workflow.source_exclude_patterns,
                &config.inner_properties.filtered_files,
            ),
        )
    }

    /// Build working root into the dist directory. The dist directory, the
    /// configuration files and a deployment target nested in the build root
    /// are never sources.
    pub fn dist(config: &HandoffConfig) -> Self {
        let workflow = &config.workflow_properties;
        let layout = &config.layout;

        let mut excludes = vec![
            format!("{}/**", slash(&workflow.dist_directory)),
            "maven-tasks/**".to_string(),
            WORKFLOW_PROPERTIES_FILE.to_string(),
            WORKFLOW_OVERRIDE_FILE.to_string(),
        ];
        if let Some(nested) = nested_under(&layout.deploy_root, &layout.build_root) {
            excludes.push(format!("{}/**", slash(&nested)));
        }

        Self::new(
            StageKind::Dist,
            &layout.build_root,
            &layout.dist_root,
            compile(
                &workflow.dist_file_patterns,
                &excludes,
                &config.inner_properties.filtered_files,
            ),
        )
    }

    /// Dist directory into the deployment target
    pub fn deploy(config: &HandoffConfig) -> Self {
        const NONE: &[&str] = &[];
        Self::new(
            StageKind::Deploy,
            &config.layout.dist_root,
            &config.layout.deploy_root,
            compile(&["**"], NONE, &config.inner_properties.filtered_files),
        )
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Copy the selected files. The first failing path aborts the stage.
    pub fn run(&self) -> Result<StageReport, StageError> {
        info!(
            stage = %self.kind,
            from = %self.source.display(),
            to = %self.destination.display(),
            patterns = %self.patterns,
            "stage started"
        );

        let report = copy_tree(&self.source, &self.destination, &self.patterns).map_err(
            |source| StageError {
                stage: self.kind,
                source,
            },
        )?;

        info!(stage = %self.kind, files = report.len(), "stage finished");

        Ok(StageReport {
            stage: self.kind,
            source: self.source.clone(),
            destination: self.destination.clone(),
            copied: report.copied,
        })
    }
}

/// `path` relative to `root`, if it lies strictly below it
fn nested_under(path: &Path, root: &Path) -> Option<PathBuf> {
    let relative = path.strip_prefix(root).ok()?;
    let mut nested = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => nested.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!nested.as_os_str().is_empty()).then_some(nested)
}

fn slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Outcome of one stage run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: StageKind,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Relative paths written under `destination`
    pub copied: BTreeSet<PathBuf>,
}

/// A stage's copy failed
#[derive(Debug, thiserror::Error)]
#[error("stage '{stage}' failed: {source}")]
pub struct StageError {
    pub stage: StageKind,
    #[source]
    pub source: CopyError,
}

impl StageError {
    /// The path the copy failed on, if any
    pub fn path(&self) -> Option<&Path> {
        self.source.path().map(PathBuf::as_path)
    }
}
