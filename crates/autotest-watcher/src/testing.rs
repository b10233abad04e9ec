//! Test doubles shared by the unit tests.

use crate::backend::WatchBackend;
use crate::error::BackendError;
use crate::runner::CommandRunner;
use autotest_core::{IgnorePolicy, RunOutcome, WatchConfig};
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// In-memory backend; remembers what it was asked to watch.
#[derive(Default)]
pub struct FakeBackend {
    pub watched: HashSet<PathBuf>,
    /// Paths that report `PathGone` on watch.
    pub gone: HashSet<PathBuf>,
    /// Paths that fail with a real error on watch or unwatch.
    pub broken: HashSet<PathBuf>,
}

impl WatchBackend for FakeBackend {
    fn watch(&mut self, path: &Path) -> Result<(), BackendError> {
        if self.broken.contains(path) {
            return Err(notify::Error::generic("no space left on device").into());
        }
        if self.gone.contains(path) {
            return Err(BackendError::PathGone);
        }
        self.watched.insert(path.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> Result<(), BackendError> {
        if self.broken.contains(path) {
            return Err(notify::Error::generic("bad file descriptor").into());
        }
        if self.watched.remove(path) {
            Ok(())
        } else {
            Err(BackendError::NotWatched)
        }
    }
}

pub fn default_policy() -> IgnorePolicy {
    IgnorePolicy::from_config(&WatchConfig::default()).unwrap()
}

/// Runner that records when each run started and what it was given.
pub struct RecordingRunner {
    pub starts: Arc<Mutex<Vec<Instant>>>,
    pub watched: Arc<Mutex<Vec<Vec<PathBuf>>>>,
    pub outcomes: VecDeque<RunOutcome>,
    pub duration: Duration,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            starts: Arc::default(),
            watched: Arc::default(),
            outcomes: VecDeque::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn taking(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = RunOutcome>) -> Self {
        self.outcomes = outcomes.into_iter().collect();
        self
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, watched: &[PathBuf]) -> impl Future<Output = RunOutcome> + Send {
        let starts = Arc::clone(&self.starts);
        self.watched.lock().unwrap().push(watched.to_vec());
        let outcome = self.outcomes.pop_front().unwrap_or(RunOutcome::Passed);
        let duration = self.duration;

        async move {
            starts.lock().unwrap().push(Instant::now());
            if !duration.is_zero() {
                tokio::time::sleep(duration).await;
            }
            outcome
        }
    }
}
