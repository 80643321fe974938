//! Filesystem change notifications
//!
//! The notifier runs on its own thread and only ever pushes work items onto
//! a channel; the coordinator loop is the single consumer.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::info;

use super::WatchError;

/// A queued work item for the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Paths were created, modified or removed
    Changed(Vec<PathBuf>),
    /// Transient notifier failure
    Error(String),
}

/// Recursive filesystem notifier feeding a channel
pub struct FsNotifier {
    _watcher: RecommendedWatcher,
}

impl FsNotifier {
    /// Start watching `root` recursively, sending events to `tx`
    pub fn start(root: &Path, tx: Sender<WatchEvent>) -> Result<Self, WatchError> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => match convert_event(event) {
                    Some(event) => event,
                    None => return,
                },
                Err(e) => WatchEvent::Error(e.to_string()),
            };
            // The receiver is gone once the coordinator has stopped
            let _ = tx.send(event);
        })
        .map_err(|source| WatchError::Notifier {
            path: root.to_path_buf(),
            source,
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Notifier {
                path: root.to_path_buf(),
                source,
            })?;

        info!(root = %root.display(), "watching for changes");

        Ok(Self { _watcher: watcher })
    }
}

/// Map a notify event to a work item. Pure reads are dropped.
pub fn convert_event(event: Event) -> Option<WatchEvent> {
    match event.kind {
        EventKind::Access(_) => None,
        EventKind::Create(_)
        | EventKind::Modify(_)
        | EventKind::Remove(_)
        | EventKind::Any
        | EventKind::Other => Some(WatchEvent::Changed(event.paths)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind) -> Event {
        Event::new(kind).add_path(PathBuf::from("/src/static/app.js"))
    }

    #[test]
    fn test_access_events_dropped() {
        assert_eq!(convert_event(event(EventKind::Access(AccessKind::Any))), None);
    }

    #[test]
    fn test_changes_forwarded() {
        for kind in [
            EventKind::Create(CreateKind::File),
            EventKind::Modify(ModifyKind::Any),
            EventKind::Remove(RemoveKind::File),
        ] {
            assert_eq!(
                convert_event(event(kind)),
                Some(WatchEvent::Changed(vec![PathBuf::from("/src/static/app.js")]))
            );
        }
    }
}
