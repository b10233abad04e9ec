//! Error types for watching.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for watch-set operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// What the OS watch layer reported.
///
/// The first two variants are races the watch set tolerates; only
/// `Notify` is a real failure.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The path disappeared before it could be watched.
    #[error("path no longer exists")]
    PathGone,

    /// The path wasn't being watched.
    #[error("path is not being watched")]
    NotWatched,

    #[error(transparent)]
    Notify(#[from] notify::Error),
}

impl BackendError {
    /// Sorts a notify error into a tolerated race or a real failure.
    pub fn classify(err: notify::Error) -> Self {
        match &err.kind {
            notify::ErrorKind::PathNotFound => Self::PathGone,
            notify::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                Self::PathGone
            }
            notify::ErrorKind::WatchNotFound => Self::NotWatched,
            _ => Self::Notify(err),
        }
    }
}

/// Things that can go wrong while maintaining the watch set.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The OS refused to watch a directory.
    #[error("failed to watch '{path}': {source}")]
    Register {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    /// The OS refused to drop a watch.
    #[error("failed to stop watching '{path}': {source}")]
    Unregister {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    /// Walking a tree for `add_recursive` hit an error partway through.
    #[error("failed to walk '{root}': {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Couldn't stat a freshly created path, for a reason other than it
    /// already being gone.
    #[error("failed to stat '{path}': {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The notify watcher itself couldn't be created.
    #[error("failed to create file watcher: {0}")]
    Init(#[source] notify::Error),
}

impl WatchError {
    pub fn register(path: impl Into<PathBuf>, source: BackendError) -> Self {
        Self::Register {
            path: path.into(),
            source,
        }
    }

    pub fn unregister(path: impl Into<PathBuf>, source: BackendError) -> Self {
        Self::Unregister {
            path: path.into(),
            source,
        }
    }

    pub fn walk(root: impl Into<PathBuf>, source: walkdir::Error) -> Self {
        Self::Walk {
            root: root.into(),
            source,
        }
    }

    pub fn stat(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Stat {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_notify_errors() {
        assert!(matches!(
            BackendError::classify(notify::Error::path_not_found()),
            BackendError::PathGone
        ));
        assert!(matches!(
            BackendError::classify(notify::Error::io(std::io::Error::from(
                std::io::ErrorKind::NotFound
            ))),
            BackendError::PathGone
        ));
        assert!(matches!(
            BackendError::classify(notify::Error::watch_not_found()),
            BackendError::NotWatched
        ));
        assert!(matches!(
            BackendError::classify(notify::Error::generic("inotify limit reached")),
            BackendError::Notify(_)
        ));
    }
}
