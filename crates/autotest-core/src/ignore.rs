//! Ignore policy.
//!
//! Two independent checks: directory names are matched exactly and only
//! while walking into subdirectories; file basenames are matched against
//! regular expressions and only for write events.

use crate::config::WatchConfig;
use crate::error::{ConfigError, Result};
use regex::Regex;
use std::collections::BTreeSet;

/// Decides whether an event is noise.
#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    dirs: BTreeSet<String>,
    files: Vec<Regex>,
}

impl IgnorePolicy {
    /// Compiles the patterns up front so matching never fails later.
    pub fn new<I, P>(dirs: BTreeSet<String>, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let files = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { dirs, files })
    }

    /// Builds the policy described by a session config.
    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        Self::new(config.ignore_dirs.clone(), &config.ignore_files)
    }

    /// True if a directory with this exact name should not be descended into.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    /// True if writes to a file with this basename are noise.
    pub fn is_ignored_file(&self, basename: &str) -> bool {
        self.files.iter().any(|re| re.is_match(basename))
    }
}
