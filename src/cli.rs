use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::Config;
use crate::error::FimError;
use crate::logging;
use crate::monitor::Monitor;
use crate::output::{self, OutputMode, ScanReporter};

/// Exit code when a check finds drift
pub const EXIT_DRIFT: u8 = 2;
/// Exit code when an operation fails
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(name = "fim")]
#[command(version)]
#[command(about = "Detect added, deleted and modified files against a recorded baseline")]
#[command(long_about = "fim records a content digest for every file under a directory and \
    later reports which files were added, deleted or modified since.\n\n\
    Examples:\n  \
    fim init ./important_files         # Record a baseline\n  \
    fim check ./important_files        # Compare against it\n  \
    fim check ./important_files --json # Machine-readable report")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity (-v lists hashed files, -vv adds digests)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and skipped-file warnings
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new baseline for a directory (replaces any existing one)
    #[command(visible_alias = "i")]
    Init {
        /// Directory to baseline
        #[arg(value_name = "DIR")]
        path: PathBuf,
    },

    /// Check a directory against its baseline
    #[command(visible_alias = "c")]
    Check {
        /// Directory to check
        #[arg(value_name = "DIR")]
        path: PathBuf,

        /// Output the report as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else if self.verbose >= 2 {
            OutputMode::VeryVerbose
        } else if self.verbose == 1 {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }

    pub fn run(self) -> anyhow::Result<ExitCode> {
        logging::init_logging(self.verbose, self.quiet);
        let output_mode = self.output_mode();

        match self.command {
            Commands::Init { ref path } => {
                let config = match Config::load(self.config.as_deref()) {
                    Ok(config) => config,
                    Err(e) => return Ok(fail(&FimError::from(e), path)),
                };
                run_init(&config, path, output_mode)
            }
            Commands::Check { ref path, json } => {
                let config = match Config::load(self.config.as_deref()) {
                    Ok(config) => config,
                    Err(e) => return Ok(fail(&FimError::from(e), path)),
                };
                run_check(&config, path, json, output_mode)
            }
        }
    }
}

fn run_init(config: &Config, path: &Path, mode: OutputMode) -> anyhow::Result<ExitCode> {
    output::print_scan_start(path, mode, "Scanning files in");

    let monitor = Monitor::from_config(config);
    let reporter = ScanReporter::new(mode, true, "Hashing files...");
    let result = monitor.initialize(path, |event| reporter.on_event(event));
    reporter.finish();

    match result {
        Ok(summary) => {
            output::print_init_summary(&summary, mode);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(fail(&e, path)),
    }
}

fn run_check(config: &Config, path: &Path, json: bool, mode: OutputMode) -> anyhow::Result<ExitCode> {
    if !json {
        output::print_scan_start(path, mode, "Checking files in");
    }

    let monitor = Monitor::from_config(config);
    let reporter = ScanReporter::new(mode, !json, "Scanning current files...");
    // in JSON mode only warnings are shown, on stderr
    let result = monitor.check(path, |event| {
        if !json || event.is_warning() {
            reporter.on_event(event);
        }
    });
    reporter.finish();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => return Ok(fail(&e, path)),
    };

    if json {
        let rendered = output::check_json(path, &summary).context("Failed to serialize report")?;
        println!("{}", rendered);
    } else {
        output::print_check_report(&summary, mode);
    }

    if summary.report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_DRIFT))
    }
}

fn fail(err: &FimError, target: &Path) -> ExitCode {
    output::print_error(err, target);
    ExitCode::from(EXIT_FAILURE)
}
