//! Autotest Core - the pure parts of the watch loop
//!
//! This crate holds everything that doesn't touch the OS watcher:
//! the session configuration, the ignore policy applied to incoming
//! events, and the tracker that turns run outcomes into status lines.
//!
//! # Example
//!
//! ```
//! use autotest_core::{RunOutcome, RunTracker};
//! use std::time::{Duration, Instant};
//!
//! let t0 = Instant::now();
//! let mut tracker = RunTracker::new();
//! tracker.record(&RunOutcome::Failed("exit status: 1".into()), t0);
//! let line = tracker
//!     .record(&RunOutcome::Passed, t0 + Duration::from_secs(12))
//!     .unwrap();
//! assert_eq!(line.text, "success after 12s failures");
//! ```

pub mod config;
pub mod error;
pub mod ignore;
pub mod status;

pub use config::{ConfigFile, WatchConfig};
pub use error::{ConfigError, Result};
pub use ignore::IgnorePolicy;
pub use status::{
    format_elapsed, round_to_second, Clock, LineKind, RunOutcome, RunStatus, RunTracker,
    StatusLine, SystemClock,
};
