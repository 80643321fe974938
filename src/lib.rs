//! Asset handoff - front-end asset synchronisation for a backend build
//!
//! Copies web assets from a project's source tree into a build working
//! directory, runs the front-end build tool there, collects the results
//! into a distribution directory and deploys them into the backend's
//! packaged output. A watch workflow repeats the first half on every
//! change.

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod patterns;
pub mod resources;
pub mod signal;
pub mod stage;
pub mod tasks;
pub mod watch;

pub use config::{HandoffConfig, InnerProperties, LayerFiles, MergedConfig, WorkflowProperties};
pub use error::{HandoffError, HandoffResult};
pub use orchestrator::{Orchestrator, Workflow, WorkflowReport};
pub use stage::{StageKind, StageReport, SyncStage};
pub use tasks::{CommandTaskRunner, TaskError, TaskRunner};
pub use watch::{WatchCoordinator, WatchSpec, WatchState};
