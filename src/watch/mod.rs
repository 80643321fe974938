//! Watch-triggered incremental re-sync
//!
//! A filesystem notifier queues change events; one coordinating loop
//! drains them and runs the prepare stage plus the configured downstream
//! tasks, never more than one cycle at a time.

mod coordinator;
mod events;
mod state;

pub use coordinator::{
    CycleHandler, CycleOutcome, WatchCoordinator, WatchSummary, DEFAULT_POLL_INTERVAL,
};
pub use events::{convert_event, FsNotifier, WatchEvent};
pub use state::WatchState;

use serde::Serialize;
use std::path::PathBuf;

use crate::config::HandoffConfig;
use crate::stage::StageError;
use crate::tasks::TaskError;

/// What to watch and what to run after each resync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchSpec {
    pub watched_root: PathBuf,
    pub downstream_tasks: Vec<String>,
}

impl WatchSpec {
    pub fn from_config(config: &HandoffConfig) -> Self {
        Self {
            watched_root: config.layout.source_root.clone(),
            downstream_tasks: config.workflow_properties.watch_tasks.clone(),
        }
    }
}

/// A watch cycle failed. Ends that cycle only.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Errors that end the watch workflow
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("could not watch {path}: {source}")]
    Notifier {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("invalid watch state transition from {from} to {to}")]
    InvalidTransition { from: WatchState, to: WatchState },

    #[error("could not install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
