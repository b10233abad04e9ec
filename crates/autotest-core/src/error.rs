//! Error types for configuration.
//!
//! Everything here is caught before a session starts, so each
//! variant names the input that has to be fixed.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for functions that can fail while building configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Things that can go wrong when assembling a session configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An ignore-file pattern isn't a valid regular expression.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Couldn't read the config file from disk.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file isn't valid JSON, or has the wrong shape.
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// There's no program to run.
    #[error("command must name a program to run")]
    EmptyCommand,
}

impl ConfigError {
    /// Creates a read error with the path for context.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error with the path for context.
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
