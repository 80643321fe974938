//! Overwrite-only tree copy
//!
//! Walks the source root in a deterministic (file name sorted) order and
//! copies every selected file to the same relative path under the
//! destination root. The first unreadable or unwritable path aborts the
//! copy; files already written stay in place.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::CopyError;
use crate::pattern::PatternSet;

/// Files written by one [`copy_tree`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Paths relative to both roots, sorted
    pub copied: BTreeSet<PathBuf>,
}

impl CopyReport {
    pub fn len(&self) -> usize {
        self.copied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copied.is_empty()
    }

    pub fn contains(&self, relative: impl AsRef<Path>) -> bool {
        self.copied.contains(relative.as_ref())
    }
}

/// Copy every file under `source` selected by `patterns` into `destination`.
///
/// The destination root is created even when nothing matches, so a later
/// stage reading from it always finds a directory. Existing destination
/// files are overwritten; files no longer selected are left alone.
///
/// If `destination` lies inside `source`, its subtree is not walked.
/// Symbolic links are not followed into directories; a link to a file is
/// copied as the file it points at.
pub fn copy_tree(
    source: &Path,
    destination: &Path,
    patterns: &PatternSet,
) -> Result<CopyReport, CopyError> {
    let matcher = patterns.compile()?;

    if !source.is_dir() {
        return Err(CopyError::MissingSource {
            path: source.to_path_buf(),
        });
    }

    fs::create_dir_all(destination).map_err(|source| CopyError::WriteDestination {
        path: destination.to_path_buf(),
        source,
    })?;

    let mut report = CopyReport::default();

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != destination);

    for entry in walker {
        let entry = entry.map_err(|err| CopyError::Walk {
            path: err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source.to_path_buf()),
            source: err,
        })?;

        let path = entry.path();
        let file_type = entry.file_type();
        if file_type.is_dir() || (file_type.is_symlink() && !path.is_file()) {
            continue;
        }

        // walkdir only yields descendants of the root
        let Ok(relative) = path.strip_prefix(source) else {
            continue;
        };

        if !matcher.is_match(relative) {
            continue;
        }

        let target = destination.join(relative);
        copy_file(path, &target)?;
        debug!(file = %relative.display(), "copied");
        report.copied.insert(relative.to_path_buf());
    }

    Ok(report)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), CopyError> {
    // open first so an unreadable source is reported as such
    fs::File::open(from).map_err(|source| CopyError::ReadSource {
        path: from.to_path_buf(),
        source,
    })?;

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|source| CopyError::WriteDestination {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::copy(from, to).map_err(|source| CopyError::WriteDestination {
        path: to.to_path_buf(),
        source,
    })?;
    Ok(())
}
