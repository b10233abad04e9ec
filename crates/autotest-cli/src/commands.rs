//! The watch command.

use crate::packages::GoWorkspace;
use crate::runner::{ColorReporter, ProcessRunner};
use autotest_core::{ConfigFile, IgnorePolicy, WatchConfig};
use autotest_watcher::{NotifyBackend, Session, WatchSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Settle period used when neither a config file nor a flag sets one.
const CLI_SETTLE: Duration = Duration::from_millis(500);

/// Options gathered from the command line.
#[derive(Debug, Default)]
pub struct WatchOptions {
    pub settle_ms: Option<u64>,
    pub ignore_dirs: Vec<String>,
    pub ignore_files: Vec<String>,
    pub command: Option<String>,
    pub config: Option<PathBuf>,
    pub no_initial_run: bool,
    pub args: Vec<String>,
}

/// Splits trailing arguments into test flags and watch targets.
pub fn split_args(args: &[String]) -> (Vec<String>, Vec<String>) {
    args.iter()
        .filter(|a| !a.is_empty())
        .cloned()
        .partition(|a| a.starts_with('-'))
}

/// Builds the session config: defaults, then the config file, then flags.
pub fn build_config(options: &WatchOptions, cwd: &Path) -> Result<WatchConfig> {
    let mut config = WatchConfig {
        settle: CLI_SETTLE,
        ..WatchConfig::default()
    };

    let file = match &options.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => ConfigFile::discover(cwd)?,
    };
    if let Some(file) = file {
        config.merge_file(file);
    }

    if let Some(ms) = options.settle_ms {
        config.settle = Duration::from_millis(ms);
    }
    config.ignore_dirs.extend(options.ignore_dirs.iter().cloned());
    config.ignore_files.extend(options.ignore_files.iter().cloned());
    if let Some(command) = &options.command {
        config.command = command.split_whitespace().map(String::from).collect();
    }
    if options.no_initial_run {
        config.run_on_start = false;
    }

    let (flags, _) = split_args(&options.args);
    config.extra_args.extend(flags);

    config.program()?;
    Ok(config)
}

/// Watches the requested trees and reruns the command until interrupted.
pub async fn watch(options: WatchOptions) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = build_config(&options, &cwd)?;
    let workspace = GoWorkspace::from_env();
    if !workspace.has_gopath() {
        debug!("GOPATH is not set, no package arguments will be passed");
    }

    let ignore = IgnorePolicy::from_config(&config)?;
    let (backend, events) = NotifyBackend::channel()?;
    let mut watch_set = WatchSet::new(backend, ignore);

    let (_, targets) = split_args(&options.args);
    for target in &targets {
        match workspace.find_package(target, &cwd) {
            Some(path) => {
                watch_set.add_recursive(&path)?;
            }
            None => warn!("package not found: {}", target),
        }
    }
    if watch_set.is_empty() {
        return Err("no paths to watch".into());
    }
    for path in watch_set.iter() {
        if let Some(pkg) = workspace.package_name(path) {
            debug!("package: {} in path: {}", pkg, path.display());
        }
    }

    let settle = config.settle;
    let run_on_start = config.run_on_start;
    let runner = ProcessRunner::new(config, workspace);
    let session = Session::new(watch_set, events, runner, settle)
        .run_on_start(run_on_start)
        .with_reporter(ColorReporter);

    let mut handle = session.spawn();
    let finished = tokio::select! {
        _ = shutdown_signal() => None,
        report = handle.finished() => Some(report),
    };
    let report = match finished {
        Some(report) => report,
        None => {
            debug!("stop requested");
            handle.stop();
            handle.finished().await
        }
    };

    if let Some(report) = report {
        debug!(
            "session ended after {} runs, status {}",
            report.runs, report.status
        );
    }
    info!("exiting");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
