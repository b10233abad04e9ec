//! Autotest Watcher - watch set maintenance and change debouncing
//!
//! This crate handles the file system side of things:
//! - Keeping one OS watch per directory, as directories come and go
//! - Sorting raw events into noise, watch-set updates and real changes
//! - Waiting for changes to settle, then running the command once
//!
//! Everything runs on a single session task, so nothing here locks.

mod backend;
mod classifier;
mod debounce;
mod error;
mod runner;
mod session;
mod watch_set;

#[cfg(test)]
mod testing;

pub use backend::{raw_events, EventKinds, NotifyBackend, RawEvent, SourceEvent, WatchBackend};
pub use classifier::{classify, Classification};
pub use debounce::{DebounceState, Debouncer};
pub use error::{BackendError, Result, WatchError};
pub use runner::{CommandRunner, LogReporter, StatusReporter};
pub use session::{Session, SessionHandle, SessionReport};
pub use watch_set::WatchSet;
