//! The OS notification source.
//!
//! Uses the notify crate with one non-recursive watch per directory, so
//! the watch set decides exactly what is observed. Raw notify events are
//! flattened into [`RawEvent`]s and pushed onto a channel for the session.

use crate::error::{BackendError, Result, WatchError};
use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ops::BitOr;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Registration side of the OS watcher.
pub trait WatchBackend: Send {
    /// Starts delivering events for `path`.
    fn watch(&mut self, path: &Path) -> std::result::Result<(), BackendError>;

    /// Stops delivering events for `path`.
    fn unwatch(&mut self, path: &Path) -> std::result::Result<(), BackendError>;
}

/// The kinds of change carried by a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventKinds {
    pub created: bool,
    pub removed: bool,
    pub written: bool,
}

impl EventKinds {
    pub const CREATED: Self = Self {
        created: true,
        removed: false,
        written: false,
    };
    pub const REMOVED: Self = Self {
        created: false,
        removed: true,
        written: false,
    };
    pub const WRITTEN: Self = Self {
        created: false,
        removed: false,
        written: true,
    };

    pub fn is_empty(self) -> bool {
        !(self.created || self.removed || self.written)
    }
}

impl BitOr for EventKinds {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            created: self.created || rhs.created,
            removed: self.removed || rhs.removed,
            written: self.written || rhs.written,
        }
    }
}

/// One path and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub kinds: EventKinds,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, kinds: EventKinds) -> Self {
        Self {
            path: path.into(),
            kinds,
        }
    }
}

/// What the notification channel carries.
#[derive(Debug)]
pub enum SourceEvent {
    Notification(RawEvent),
    /// An asynchronous error reported by the watcher thread.
    Error(notify::Error),
}

/// Flattens a notify event into per-path raw events.
///
/// Renames become a removal of the old name and a creation of the new
/// one. Metadata and access events carry no change and are dropped.
pub fn raw_events(event: Event) -> Vec<RawEvent> {
    let kinds = match event.kind {
        EventKind::Create(_) => EventKinds::CREATED,
        EventKind::Remove(_) => EventKinds::REMOVED,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => EventKinds::REMOVED,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => EventKinds::CREATED,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths are [from, to]
            return event
                .paths
                .into_iter()
                .enumerate()
                .map(|(i, path)| {
                    let kinds = if i == 0 {
                        EventKinds::REMOVED
                    } else {
                        EventKinds::CREATED
                    };
                    RawEvent::new(path, kinds)
                })
                .collect();
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            // The backend couldn't tell which side of the rename this is.
            return event
                .paths
                .into_iter()
                .map(|path| {
                    let kinds = if path.exists() {
                        EventKinds::CREATED
                    } else {
                        EventKinds::REMOVED
                    };
                    RawEvent::new(path, kinds)
                })
                .collect();
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => EventKinds::WRITTEN,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
    };

    event
        .paths
        .into_iter()
        .map(|path| RawEvent::new(path, kinds))
        .collect()
}

/// [`WatchBackend`] backed by the platform's recommended notify watcher.
pub struct NotifyBackend {
    watcher: RecommendedWatcher,
}

impl NotifyBackend {
    /// Creates a watcher that forwards everything it sees to `tx`.
    pub fn new(tx: UnboundedSender<SourceEvent>) -> Result<Self> {
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let items = match res {
                Ok(event) => raw_events(event)
                    .into_iter()
                    .map(SourceEvent::Notification)
                    .collect(),
                Err(e) => vec![SourceEvent::Error(e)],
            };
            for item in items {
                if tx.send(item).is_err() {
                    // Session is gone; nothing left to deliver to.
                    debug!("dropping file system event, session has stopped");
                    return;
                }
            }
        })
        .map_err(WatchError::Init)?;

        Ok(Self { watcher })
    }

    /// Creates a watcher along with the receiving end of its channel.
    pub fn channel() -> Result<(Self, UnboundedReceiver<SourceEvent>)> {
        let (tx, rx) = unbounded_channel();
        Ok((Self::new(tx)?, rx))
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&mut self, path: &Path) -> std::result::Result<(), BackendError> {
        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(BackendError::classify)
    }

    fn unwatch(&mut self, path: &Path) -> std::result::Result<(), BackendError> {
        self.watcher.unwatch(path).map_err(|e| {
            let err = BackendError::classify(e);
            if let BackendError::Notify(ref inner) = err {
                warn!("unwatch failed for {}: {}", path.display(), inner);
            }
            err
        })
    }
}
