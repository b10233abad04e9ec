//! Launching the test command and showing its status.

use crate::packages::GoWorkspace;
use autotest_core::{LineKind, RunOutcome, StatusLine, WatchConfig};
use autotest_watcher::{CommandRunner, StatusReporter};
use colored::Colorize;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Runs the configured command as a child process, output inherited.
pub struct ProcessRunner {
    config: WatchConfig,
    workspace: GoWorkspace,
}

impl ProcessRunner {
    pub fn new(config: WatchConfig, workspace: GoWorkspace) -> Self {
        Self { config, workspace }
    }

    /// Program and arguments for a run over `watched`.
    pub fn invocation(&self, watched: &[PathBuf]) -> (String, Vec<String>, usize) {
        let program = self.config.command.first().cloned().unwrap_or_default();
        let units = self.workspace.units(watched);
        let args = self.config.command_args(&units);
        (program, args, units.len())
    }

    fn display_name(&self) -> String {
        self.config.command.join(" ")
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, watched: &[PathBuf]) -> impl Future<Output = RunOutcome> + Send {
        let (program, args, units) = self.invocation(watched);
        let name = self.display_name();

        async move {
            info!("running {} with {} units", name, units);
            let status = Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .status()
                .await;

            match status {
                Ok(status) if status.success() => RunOutcome::Passed,
                Ok(status) => RunOutcome::Failed(status.to_string()),
                Err(e) => RunOutcome::Failed(format!("failed to launch '{}': {}", program, e)),
            }
        }
    }
}

/// Prints status transitions in color: red for failures, green for
/// recoveries.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorReporter;

impl ColorReporter {
    pub fn render(line: &StatusLine) -> String {
        match line.kind {
            LineKind::Failure => line.text.red().to_string(),
            LineKind::Recovery => line.text.green().to_string(),
        }
    }
}

impl StatusReporter for ColorReporter {
    fn report(&mut self, line: &StatusLine) {
        println!("{}", Self::render(line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(command: &[&str], extra: &[&str], gopath: Option<&str>) -> ProcessRunner {
        let config = WatchConfig {
            command: command.iter().map(|s| s.to_string()).collect(),
            extra_args: extra.iter().map(|s| s.to_string()).collect(),
            ..WatchConfig::default()
        };
        ProcessRunner::new(config, GoWorkspace::from_vars(gopath.map(Into::into), None))
    }

    #[test]
    fn test_invocation_appends_packages() {
        let r = runner(&["go", "test"], &["-short"], Some("/go"));
        let watched = vec![PathBuf::from("/go/src/a"), PathBuf::from("/go/src/a/b")];

        let (program, args, units) = r.invocation(&watched);
        assert_eq!(program, "go");
        assert_eq!(args, vec!["test", "-short", "a", "a/b"]);
        assert_eq!(units, 2);
    }

    #[test]
    fn test_invocation_without_gopath() {
        let r = runner(&["cargo", "test"], &["--quiet"], None);
        let (program, args, units) = r.invocation(&[PathBuf::from("/work/src")]);
        assert_eq!(program, "cargo");
        assert_eq!(args, vec!["test", "--quiet"]);
        assert_eq!(units, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_becomes_outcome() {
        assert_eq!(runner(&["true"], &[], None).run(&[]).await, RunOutcome::Passed);

        match runner(&["false"], &[], None).run(&[]).await {
            RunOutcome::Failed(reason) => assert!(reason.contains("exit status")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_launch_failure_is_a_failed_run() {
        let outcome = runner(&["autotest-no-such-program"], &[], None)
            .run(&[])
            .await;
        match outcome {
            RunOutcome::Failed(reason) => assert!(reason.contains("failed to launch")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_render_keeps_text() {
        colored::control::set_override(false);
        let line = StatusLine {
            kind: LineKind::Recovery,
            text: "success after 3s failures".into(),
        };
        assert_eq!(ColorReporter::render(&line), "success after 3s failures");
    }
}
