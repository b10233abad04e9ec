//! Session configuration.
//!
//! A [`WatchConfig`] is built once, before the session starts, and is
//! never touched again. Values come from the defaults, then an optional
//! JSON file, then command-line flags.

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default quiet period before a run is triggered.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = ".autotest.json";

/// Everything a watch session needs to know up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// How long to wait after the last change before running.
    pub settle: Duration,

    /// Directory names that are never descended into.
    pub ignore_dirs: BTreeSet<String>,

    /// Regular expressions matched against the basename of written files.
    pub ignore_files: Vec<String>,

    /// Extra flags passed to the command, before the unit arguments.
    pub extra_args: Vec<String>,

    /// Program and base arguments, e.g. `["go", "test"]`.
    pub command: Vec<String>,

    /// Run the command once as soon as the session starts.
    pub run_on_start: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
            ignore_dirs: BTreeSet::from([".git".to_string()]),
            ignore_files: vec![r"\..*\.swp$".to_string()],
            extra_args: Vec::new(),
            command: vec!["go".to_string(), "test".to_string()],
            run_on_start: true,
        }
    }
}

impl WatchConfig {
    /// The program to launch.
    pub fn program(&self) -> Result<&str> {
        self.command
            .first()
            .map(String::as_str)
            .ok_or(ConfigError::EmptyCommand)
    }

    /// Arguments for one run: base args, extra flags, then the units.
    pub fn command_args(&self, units: &[String]) -> Vec<String> {
        self.command
            .iter()
            .skip(1)
            .chain(&self.extra_args)
            .chain(units)
            .cloned()
            .collect()
    }

    /// Overlays the values set in a config file.
    pub fn merge_file(&mut self, file: ConfigFile) {
        if let Some(ms) = file.settle_ms {
            self.settle = Duration::from_millis(ms);
        }
        if let Some(dirs) = file.ignore_dirs {
            self.ignore_dirs = dirs.into_iter().collect();
        }
        if let Some(patterns) = file.ignore_files {
            self.ignore_files = patterns;
        }
        if let Some(command) = file.command {
            self.command = command;
        }
        if let Some(flags) = file.test_flags {
            self.extra_args = flags;
        }
        if let Some(run) = file.run_on_start {
            self.run_on_start = run;
        }
    }
}

/// On-disk shape of `.autotest.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub settle_ms: Option<u64>,
    pub ignore_dirs: Option<Vec<String>>,
    pub ignore_files: Option<Vec<String>>,
    pub command: Option<Vec<String>>,
    pub test_flags: Option<Vec<String>>,
    pub run_on_start: Option<bool>,
}

impl ConfigFile {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::parse(path, e))
    }

    /// Loads `.autotest.json` from `dir` if there is one.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!("no {} in {}", CONFIG_FILE_NAME, dir.display());
            return Ok(None);
        }
        debug!("loading config from {}", path.display());
        Self::load(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = WatchConfig::default();
        assert_eq!(config.settle, Duration::from_secs(2));
        assert!(config.ignore_dirs.contains(".git"));
        assert_eq!(config.program().unwrap(), "go");
        assert!(config.run_on_start);
    }

    #[test]
    fn test_command_args_order() {
        let config = WatchConfig {
            extra_args: vec!["-v".into(), "-run=TestX".into()],
            ..WatchConfig::default()
        };
        let args = config.command_args(&["example.com/a".into(), "example.com/b".into()]);
        assert_eq!(
            args,
            vec!["test", "-v", "-run=TestX", "example.com/a", "example.com/b"]
        );
    }

    #[test]
    fn test_empty_command() {
        let config = WatchConfig {
            command: Vec::new(),
            ..WatchConfig::default()
        };
        assert!(matches!(config.program(), Err(ConfigError::EmptyCommand)));
    }

    #[test]
    fn test_merge_file_overrides_only_set_fields() {
        let mut config = WatchConfig::default();
        config.merge_file(ConfigFile {
            settle_ms: Some(250),
            command: Some(vec!["cargo".into(), "test".into()]),
            ..ConfigFile::default()
        });

        assert_eq!(config.settle, Duration::from_millis(250));
        assert_eq!(config.program().unwrap(), "cargo");
        // Untouched fields keep their defaults
        assert!(config.ignore_dirs.contains(".git"));
        assert_eq!(config.ignore_files, vec![r"\..*\.swp$".to_string()]);
    }

    #[test]
    fn test_discover_config_file() {
        let dir = tempdir().unwrap();
        assert!(ConfigFile::discover(dir.path()).unwrap().is_none());

        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "settle_ms": 100, "ignore_dirs": ["target", ".git"] }"#,
        )
        .unwrap();

        let file = ConfigFile::discover(dir.path()).unwrap().unwrap();
        assert_eq!(file.settle_ms, Some(100));
        assert_eq!(
            file.ignore_dirs,
            Some(vec!["target".to_string(), ".git".to_string()])
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "settle": 100 }"#).unwrap();

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
