//! Autotest CLI - watches source trees and reruns tests on change
//!
//! Everything after the options is a mix of test flags (anything starting
//! with `-`), filesystem paths, and Go package names. Autotest options have
//! no short forms, so `-v` or `-run=TestX` go to the test command. A flag
//! spelled like an autotest option needs a `--` before it.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod packages;
mod runner;

#[derive(Parser)]
#[command(name = "autotest")]
#[command(author = "Autotest Contributors")]
#[command(version)]
#[command(
    about = "Monitors the file system and automatically runs 'go test' on changes",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// Quiet period after the last change before running, in milliseconds
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,

    /// Directory name to skip when watching (repeatable)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    ignore_dirs: Vec<String>,

    /// Regex for file names whose writes are ignored (repeatable)
    #[arg(long = "ignore-file", value_name = "REGEX")]
    ignore_files: Vec<String>,

    /// Command to run instead of 'go test'
    #[arg(long, value_name = "CMD")]
    command: Option<String>,

    /// Config file (defaults to ./.autotest.json when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Don't run the command until the first change
    #[arg(long)]
    no_initial_run: bool,

    /// Test flags, paths (watched recursively) and package names
    #[arg(value_name = "ARGS", allow_hyphen_values = true, trailing_var_arg = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let options = commands::WatchOptions {
        settle_ms: cli.settle_ms,
        ignore_dirs: cli.ignore_dirs,
        ignore_files: cli.ignore_files,
        command: cli.command,
        config: cli.config,
        no_initial_run: cli.no_initial_run,
        args: cli.args,
    };

    if let Err(e) = commands::watch(options).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags_go_to_the_command() {
        let cli = Cli::try_parse_from(["autotest", "-v", "-count=1", "./pkg"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
        assert_eq!(cli.args, vec!["-v", "-count=1", "./pkg"]);
    }

    #[test]
    fn test_long_options_still_parse() {
        let cli = Cli::try_parse_from([
            "autotest",
            "--verbose",
            "--command",
            "cargo test",
            "src",
            "-q",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command.as_deref(), Some("cargo test"));
        assert_eq!(cli.args, vec!["src", "-q"]);
    }
}
