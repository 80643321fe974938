//! Workflow orchestration
//!
//! The orchestrator owns the resolved configuration and the build tool
//! runner, and sequences the sync stages into named workflows:
//!
//! - `default` / `maven`: prepare → build tasks → dist → deploy
//! - `maven-watch`: prepare + downstream tasks on every change burst
//!
//! Stage descriptors are derived from the configuration on every run; the
//! configuration itself is never re-read mid-run.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::time::Duration;
use tracing::info;

use crate::config::HandoffConfig;
use crate::error::HandoffResult;
use crate::stage::{StageError, StageKind, StageReport, SyncStage};
use crate::tasks::{CommandTaskRunner, TaskError, TaskRunner};
use crate::watch::{
    CycleError, CycleHandler, FsNotifier, WatchCoordinator, WatchError, WatchSpec, WatchSummary,
};

/// One-shot workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workflow {
    /// prepare+dist, run directly
    Default,
    /// prepare+dist, triggered from the backend build
    Maven,
}

impl Workflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Workflow::Default => "default",
            Workflow::Maven => "maven",
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages completed by a one-shot workflow, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowReport {
    pub workflow: Workflow,
    pub stages: Vec<StageReport>,
    pub tasks: Vec<String>,
}

impl WorkflowReport {
    pub fn stage(&self, kind: StageKind) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == kind)
    }
}

/// Owns the configuration and task runner for one process
pub struct Orchestrator {
    config: HandoffConfig,
    runner: Box<dyn TaskRunner>,
}

impl Orchestrator {
    pub fn new(config: HandoffConfig, runner: Box<dyn TaskRunner>) -> Self {
        Self { config, runner }
    }

    /// Use the configured build executable, run in the build working root
    pub fn with_command_runner(config: HandoffConfig) -> Self {
        let runner =
            CommandTaskRunner::from_properties(&config.workflow_properties, &config.layout.build_root);
        Self::new(config, Box::new(runner))
    }

    pub fn config(&self) -> &HandoffConfig {
        &self.config
    }

    /// Build a fresh descriptor for `kind`
    pub fn stage(&self, kind: StageKind) -> SyncStage {
        SyncStage::for_kind(kind, &self.config)
    }

    pub fn run_stage(&self, kind: StageKind) -> Result<StageReport, StageError> {
        self.stage(kind).run()
    }

    /// Run tasks in order, stopping at the first failure
    pub fn run_tasks(&mut self, tasks: &[String]) -> Result<(), TaskError> {
        for task in tasks {
            self.runner.run_task(task)?;
        }
        Ok(())
    }

    /// Run a one-shot workflow. The first failing stage or task aborts the
    /// rest; files already copied stay where they are.
    pub fn run(&mut self, workflow: Workflow) -> HandoffResult<WorkflowReport> {
        info!(%workflow, "workflow started");
        let mut report = WorkflowReport {
            workflow,
            stages: Vec::with_capacity(3),
            tasks: Vec::new(),
        };

        report.stages.push(self.run_stage(StageKind::Prepare)?);

        let build_tasks = self.config.workflow_properties.build_tasks.clone();
        self.run_tasks(&build_tasks)?;
        report.tasks = build_tasks;

        report.stages.push(self.run_stage(StageKind::Dist)?);
        report.stages.push(self.run_stage(StageKind::Deploy)?);

        info!(%workflow, "workflow finished");
        Ok(report)
    }

    pub fn watch_spec(&self) -> WatchSpec {
        WatchSpec::from_config(&self.config)
    }

    /// Watch the source asset root until `shutdown` is set.
    ///
    /// Blocks the calling thread. Cycle failures are logged and the loop
    /// keeps listening.
    pub fn watch(&mut self, shutdown: &AtomicBool) -> Result<WatchSummary, WatchError> {
        let spec = self.watch_spec();
        let (tx, rx) = mpsc::channel();
        let _notifier = FsNotifier::start(&spec.watched_root, tx)?;

        let debounce = Duration::from_millis(self.config.workflow_properties.watch_debounce_ms);
        let mut coordinator = WatchCoordinator::new(spec).with_debounce(debounce);
        coordinator.run(&rx, self, shutdown)
    }
}

impl CycleHandler for Orchestrator {
    fn resync(&mut self) -> Result<StageReport, CycleError> {
        Ok(self.run_stage(StageKind::Prepare)?)
    }

    fn run_downstream(&mut self, tasks: &[String]) -> Result<(), CycleError> {
        Ok(self.run_tasks(tasks)?)
    }
}
