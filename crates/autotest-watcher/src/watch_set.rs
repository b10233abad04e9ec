//! The set of watched directories.
//!
//! Paths are kept in insertion order so runs see the trees in the order
//! they were given. Every entry has a live OS watch behind it, except
//! where the directory vanished after it was added.

use crate::backend::WatchBackend;
use crate::error::{BackendError, Result, WatchError};
use autotest_core::IgnorePolicy;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directories currently receiving change notifications.
pub struct WatchSet<B> {
    backend: B,
    ignore: IgnorePolicy,
    paths: Vec<PathBuf>,
}

impl<B: WatchBackend> WatchSet<B> {
    pub fn new(backend: B, ignore: IgnorePolicy) -> Self {
        Self {
            backend,
            ignore,
            paths: Vec::new(),
        }
    }

    /// Watches a single path.
    ///
    /// Returns `true` if the path is new to the set. A path that vanished
    /// before the OS watch could be set up is skipped without error.
    pub fn add(&mut self, path: &Path) -> Result<bool> {
        if self.contains(path) {
            return Ok(false);
        }

        match self.backend.watch(path) {
            Ok(()) => {}
            Err(BackendError::PathGone) => {
                debug!("gone before it could be watched: {}", path.display());
                return Ok(false);
            }
            Err(e) => return Err(WatchError::register(path, e)),
        }

        self.paths.push(path.to_path_buf());
        info!("watching for changes: {}", path.display());
        Ok(true)
    }

    /// Watches `root` and every directory below it.
    ///
    /// Subtrees whose directory name is ignored are skipped whole. The
    /// root itself is always watched. Returns how many paths were added.
    pub fn add_recursive(&mut self, root: &Path) -> Result<usize> {
        let mut added = 0;
        let mut walker = WalkDir::new(root).into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| WatchError::walk(root, e))?;
            if !entry.file_type().is_dir() {
                continue;
            }

            if entry.depth() > 0 && self.ignore.is_ignored_dir(&entry.file_name().to_string_lossy())
            {
                debug!("skipping: {}", entry.path().display());
                walker.skip_current_dir();
                continue;
            }

            if self.add(entry.path())? {
                added += 1;
            }
        }

        Ok(added)
    }

    /// Stops watching a path.
    ///
    /// Returns `true` if the path was in the set. Removing something the
    /// OS isn't watching (a plain file, or a directory whose watch died
    /// with it) is not an error.
    pub fn remove(&mut self, path: &Path) -> Result<bool> {
        let tracked = match self.paths.iter().position(|p| p == path) {
            Some(i) => {
                self.paths.remove(i);
                true
            }
            None => false,
        };

        match self.backend.unwatch(path) {
            Ok(()) => {}
            Err(BackendError::NotWatched | BackendError::PathGone) => {}
            Err(e) => return Err(WatchError::unregister(path, e)),
        }

        if tracked {
            debug!("stopped watching: {}", path.display());
        }
        Ok(tracked)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Watched paths, in insertion order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn ignore(&self) -> &IgnorePolicy {
        &self.ignore
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
