//! The watch session loop.
//!
//! One task owns the watch set, the debouncer and the run tracker. Each
//! iteration waits for whichever comes first: a stop request, the settle
//! deadline, or the next notification. Runs are awaited inline, so events
//! that arrive mid-run queue up and are looked at once the run is over.

use crate::backend::{RawEvent, SourceEvent, WatchBackend};
use crate::classifier::classify;
use crate::debounce::Debouncer;
use crate::runner::{CommandRunner, LogReporter, StatusReporter};
use crate::watch_set::WatchSet;
use autotest_core::{Clock, RunStatus, RunTracker, SystemClock};
use std::time::Duration;
use tokio::sync::{mpsc::UnboundedReceiver, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// One turn of the loop.
#[derive(Debug)]
enum LoopEvent {
    Notification(RawEvent),
    SourceError(notify::Error),
    TimerFired,
    StopRequested,
    /// The notification channel closed; nothing more will arrive.
    SourceClosed,
}

/// Summary handed to whoever waits on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub runs: usize,
    pub status: RunStatus,
    pub watched: usize,
}

/// A configured watch session, ready to be spawned.
pub struct Session<B, R> {
    watch_set: WatchSet<B>,
    events: UnboundedReceiver<SourceEvent>,
    runner: R,
    debouncer: Debouncer,
    tracker: RunTracker,
    clock: Box<dyn Clock>,
    reporter: Box<dyn StatusReporter>,
    run_on_start: bool,
    runs: usize,
}

impl<B, R> Session<B, R>
where
    B: WatchBackend + 'static,
    R: CommandRunner + 'static,
{
    pub fn new(
        watch_set: WatchSet<B>,
        events: UnboundedReceiver<SourceEvent>,
        runner: R,
        settle: Duration,
    ) -> Self {
        Self {
            watch_set,
            events,
            runner,
            debouncer: Debouncer::new(settle),
            tracker: RunTracker::new(),
            clock: Box::new(SystemClock),
            reporter: Box::new(LogReporter),
            run_on_start: false,
            runs: 0,
        }
    }

    /// Runs the command once before waiting for changes.
    pub fn run_on_start(mut self, yes: bool) -> Self {
        self.run_on_start = yes;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_reporter(mut self, reporter: impl StatusReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Starts the loop on the tokio runtime.
    pub fn spawn(self) -> SessionHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(self.run(stop_rx, done_tx));
        SessionHandle {
            stop: Some(stop_tx),
            finished: done_rx,
        }
    }

    async fn run(
        mut self,
        mut stop: oneshot::Receiver<()>,
        finished: oneshot::Sender<SessionReport>,
    ) {
        if self.run_on_start {
            self.trigger().await;
        }

        loop {
            match self.next_event(&mut stop).await {
                LoopEvent::Notification(event) => self.handle_notification(&event),
                LoopEvent::SourceError(e) => warn!("error: {}", e),
                LoopEvent::TimerFired => {
                    if self.debouncer.expire(Instant::now()) {
                        self.trigger().await;
                    }
                }
                LoopEvent::StopRequested => break,
                LoopEvent::SourceClosed => {
                    warn!("file system notifications stopped");
                    break;
                }
            }
        }

        if self.debouncer.cancel() {
            debug!("dropping pending changes at shutdown");
        }
        let report = SessionReport {
            runs: self.runs,
            status: self.tracker.status(),
            watched: self.watch_set.len(),
        };
        if finished.send(report).is_err() {
            debug!("nobody waiting for session to finish");
        }
    }

    async fn next_event(&mut self, stop: &mut oneshot::Receiver<()>) -> LoopEvent {
        let deadline = self.debouncer.deadline();

        tokio::select! {
            biased;

            // A dropped handle counts as a stop request too
            _ = stop => LoopEvent::StopRequested,
            _ = settle_timer(deadline) => LoopEvent::TimerFired,
            event = self.events.recv() => match event {
                Some(SourceEvent::Notification(raw)) => LoopEvent::Notification(raw),
                Some(SourceEvent::Error(e)) => LoopEvent::SourceError(e),
                None => LoopEvent::SourceClosed,
            },
        }
    }

    fn handle_notification(&mut self, event: &RawEvent) {
        let result = classify(event, &mut self.watch_set);
        match result.error {
            Some(e) => warn!("error: {}", e),
            None if result.modified => self.debouncer.arm(Instant::now()),
            None => {}
        }
    }

    async fn trigger(&mut self) {
        let watched = self.watch_set.paths().to_vec();
        let outcome = self.runner.run(&watched).await;
        self.runs += 1;
        if let Some(line) = self.tracker.record(&outcome, self.clock.now()) {
            self.reporter.report(&line);
        }
        debug!("run {} finished, status {}", self.runs, self.tracker.status());
    }
}

async fn settle_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Controls a spawned session.
pub struct SessionHandle {
    stop: Option<oneshot::Sender<()>>,
    finished: oneshot::Receiver<SessionReport>,
}

impl SessionHandle {
    /// Asks the loop to stop. A run in progress finishes first.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            // Err means the loop already exited
            let _ = tx.send(());
        }
    }

    /// Waits for the loop to exit.
    ///
    /// Returns `None` if the session task died without reporting. Must
    /// not be awaited again once it has returned.
    pub async fn finished(&mut self) -> Option<SessionReport> {
        (&mut self.finished).await.ok()
    }
}
