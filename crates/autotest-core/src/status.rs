//! Run-status tracking.
//!
//! Each triggered run ends in a [`RunOutcome`]. The tracker folds those
//! into a three-state status and reports how long the previous state
//! lasted whenever the build flips between working and failing.

use std::fmt;
use std::time::{Duration, Instant};

/// Result of one command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Passed,
    /// The command exited non-zero or couldn't be launched.
    Failed(String),
}

/// Where the build stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    /// Nothing has run yet.
    #[default]
    Starting,
    Working,
    Failing,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Starting => "starting",
            RunStatus::Working => "working",
            RunStatus::Failing => "failing",
        };
        write!(f, "{}", s)
    }
}

/// Which way a status line should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Failure,
    Recovery,
}

/// A message produced by a status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: LineKind,
    pub text: String,
}

/// Source of timestamps for the tracker.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Rounds to the nearest whole second, halves rounding up.
pub fn round_to_second(d: Duration) -> Duration {
    const NANOS: u128 = 1_000_000_000;
    let secs = (d.as_nanos() + NANOS / 2) / NANOS;
    Duration::from_secs(u64::try_from(secs).unwrap_or(u64::MAX))
}

/// Renders an elapsed time as whole seconds, e.g. `125s`.
pub fn format_elapsed(d: Duration) -> String {
    format!("{}s", round_to_second(d).as_secs())
}

/// Follows run outcomes across a session.
#[derive(Debug, Clone, Default)]
pub struct RunTracker {
    status: RunStatus,
    time_success: Option<Instant>,
    time_failure: Option<Instant>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// When the status last became `Working`.
    pub fn time_success(&self) -> Option<Instant> {
        self.time_success
    }

    /// When the status last became `Failing`.
    pub fn time_failure(&self) -> Option<Instant> {
        self.time_failure
    }

    /// Records one outcome and returns the line to show, if any.
    ///
    /// Failures always produce a line. Successes only produce one when
    /// they end a run of failures.
    pub fn record(&mut self, outcome: &RunOutcome, now: Instant) -> Option<StatusLine> {
        let previous = self.status;

        match outcome {
            RunOutcome::Failed(reason) => {
                let mut text = format!("error: {}", reason);
                if previous != RunStatus::Failing {
                    self.time_failure = Some(now);
                }
                if previous == RunStatus::Working {
                    if let Some(since) = self.time_success {
                        text.push_str(&format!(
                            " ({} success)",
                            format_elapsed(now.saturating_duration_since(since))
                        ));
                    }
                }
                self.status = RunStatus::Failing;
                Some(StatusLine {
                    kind: LineKind::Failure,
                    text,
                })
            }
            RunOutcome::Passed => {
                if previous != RunStatus::Working {
                    self.time_success = Some(now);
                }
                self.status = RunStatus::Working;
                if previous != RunStatus::Failing {
                    return None;
                }
                let since = self.time_failure?;
                Some(StatusLine {
                    kind: LineKind::Recovery,
                    text: format!(
                        "success after {} failures",
                        format_elapsed(now.saturating_duration_since(since))
                    ),
                })
            }
        }
    }
}
