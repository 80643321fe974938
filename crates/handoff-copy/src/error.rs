//! Copy errors.

use std::io;
use std::path::PathBuf;

/// Errors raised while copying a tree. Every variant names the offending
/// path or pattern so a failed stage can be re-run by hand.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("source root does not exist or is not a directory: {path}")]
    MissingSource { path: PathBuf },

    #[error("could not read source file {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write destination {path}: {source}")]
    WriteDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl CopyError {
    /// The filesystem path the error is about, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            CopyError::MissingSource { path }
            | CopyError::ReadSource { path, .. }
            | CopyError::WriteDestination { path, .. }
            | CopyError::Walk { path, .. } => Some(path),
            CopyError::Pattern { .. } => None,
        }
    }
}
