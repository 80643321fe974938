//! Top-level error type and process exit codes

use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::resources::ResourceError;
use crate::stage::StageError;
use crate::tasks::TaskError;
use crate::watch::WatchError;

/// Any failure that ends a workflow invocation
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("build task error: {0}")]
    Task(#[from] TaskError),

    #[error("watch error: {0}")]
    Watch(#[from] WatchError),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl HandoffError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            HandoffError::Config(_) => 2,
            HandoffError::Stage(_) => 3,
            HandoffError::Task(_) => 4,
            HandoffError::Watch(_) => 5,
            HandoffError::Resource(_) => 6,
            HandoffError::Io(_) => 1,
        }
    }
}

/// Result type for workflow operations
pub type HandoffResult<T> = Result<T, HandoffError>;
