//! Seams to the outside world: running the command and showing status.

use autotest_core::{LineKind, RunOutcome, StatusLine};
use std::future::Future;
use std::path::PathBuf;
use tracing::{error, info};

/// Runs the configured command once.
///
/// The session awaits each run to completion before looking at the next
/// event, so implementations never run concurrently with themselves.
pub trait CommandRunner: Send {
    /// Runs against the currently watched paths.
    fn run(&mut self, watched: &[PathBuf]) -> impl Future<Output = RunOutcome> + Send;
}

/// Receives status lines produced by run-status transitions.
pub trait StatusReporter: Send {
    fn report(&mut self, line: &StatusLine);
}

/// Reports status lines through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    fn report(&mut self, line: &StatusLine) {
        match line.kind {
            LineKind::Failure => error!("{}", line.text),
            LineKind::Recovery => info!("{}", line.text),
        }
    }
}
