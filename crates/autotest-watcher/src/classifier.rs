//! Event classification.
//!
//! Decides what a raw event means: a new directory to watch, a vanished
//! path to forget, a change that should eventually trigger a run, or
//! noise. Editors produce a lot of the latter.

use crate::backend::{RawEvent, WatchBackend};
use crate::error::WatchError;
use crate::watch_set::WatchSet;
use std::fs;
use std::io;
use tracing::debug;

/// What one raw event amounted to.
#[derive(Debug, Default)]
pub struct Classification {
    /// The event counts as a qualifying modification.
    pub modified: bool,
    /// The first error that wasn't a tolerated race.
    pub error: Option<WatchError>,
}

impl Classification {
    fn fail(&mut self, err: WatchError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// Applies one raw event to the watch set and reports whether it counts
/// as a modification.
///
/// Each kind on the event is handled in turn (created, removed, written);
/// an error on one kind doesn't stop the others.
pub fn classify<B: WatchBackend>(event: &RawEvent, watch_set: &mut WatchSet<B>) -> Classification {
    let path = event.path.as_path();
    let mut result = Classification::default();

    if event.kinds.created {
        match fs::metadata(path) {
            // Temp files are often deleted before we get to look at them
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => result.fail(WatchError::stat(path, e)),
            Ok(meta) if meta.is_dir() => {
                if let Err(e) = watch_set.add(path) {
                    result.fail(e);
                }
            }
            Ok(_) => {
                debug!("created: {}", path.display());
                result.modified = true;
            }
        }
    }

    if event.kinds.removed {
        if let Err(e) = watch_set.remove(path) {
            result.fail(e);
        }
        debug!("removed: {}", path.display());
        result.modified = true;
    }

    if event.kinds.written {
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if watch_set.ignore().is_ignored_file(&basename) {
            debug!("skipping: {}", path.display());
        } else {
            debug!("modified: {}", path.display());
            result.modified = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EventKinds;
    use crate::testing::{default_policy, FakeBackend};
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn watch_set() -> WatchSet<FakeBackend> {
        WatchSet::new(FakeBackend::default(), default_policy())
    }

    #[test]
    fn test_created_directory_is_watched_not_modified() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("newpkg");
        fs::create_dir(&sub).unwrap();

        let mut set = watch_set();
        let result = classify(&RawEvent::new(&sub, EventKinds::CREATED), &mut set);

        assert!(!result.modified);
        assert!(result.error.is_none());
        assert!(set.contains(&sub));
    }

    #[test]
    fn test_created_file_is_modified() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("main.go");
        fs::write(&file, "package main").unwrap();

        let mut set = watch_set();
        let result = classify(&RawEvent::new(&file, EventKinds::CREATED), &mut set);

        assert!(result.modified);
        assert!(set.is_empty());
    }

    #[test]
    fn test_created_then_deleted_is_noise() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("4913");

        let mut set = watch_set();
        let result = classify(&RawEvent::new(&gone, EventKinds::CREATED), &mut set);

        assert!(!result.modified);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_removed_always_modifies() {
        let mut set = watch_set();
        set.add(Path::new("/src/pkg")).unwrap();

        let result = classify(&RawEvent::new("/src/pkg", EventKinds::REMOVED), &mut set);
        assert!(result.modified);
        assert!(result.error.is_none());
        assert!(!set.contains(Path::new("/src/pkg")));

        // Already gone: still a modification, still no error
        let again = classify(&RawEvent::new("/src/pkg", EventKinds::REMOVED), &mut set);
        assert!(again.modified);
        assert!(again.error.is_none());

        // A plain file that was never watched
        let file = classify(&RawEvent::new("/src/pkg/a.go", EventKinds::REMOVED), &mut set);
        assert!(file.modified);
        assert!(file.error.is_none());
    }

    #[test]
    fn test_written_respects_ignore_patterns() {
        let mut set = watch_set();

        let swap = classify(&RawEvent::new("/src/.main.go.swp", EventKinds::WRITTEN), &mut set);
        assert!(!swap.modified);

        let real = classify(&RawEvent::new("/src/main.go", EventKinds::WRITTEN), &mut set);
        assert!(real.modified);
    }

    #[test]
    fn test_kinds_are_combined() {
        let mut set = watch_set();
        // Ignored write alone would be noise; the removal still counts
        let event = RawEvent::new(
            "/src/.main.go.swp",
            EventKinds::REMOVED | EventKinds::WRITTEN,
        );
        assert!(classify(&event, &mut set).modified);
    }

    #[test]
    fn test_error_does_not_stop_remaining_kinds() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("broken");
        fs::create_dir(&sub).unwrap();

        let mut backend = FakeBackend::default();
        backend.broken.insert(PathBuf::from(&sub));
        let mut set = WatchSet::new(backend, default_policy());

        let event = RawEvent::new(&sub, EventKinds::CREATED | EventKinds::WRITTEN);
        let result = classify(&event, &mut set);

        assert!(matches!(result.error, Some(WatchError::Register { .. })));
        assert!(result.modified);
    }
}
