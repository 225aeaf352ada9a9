//! Command-line interface parsing
//!
//! Handles argument parsing and validation.

use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use control_kit::commands::hardening::DEFAULT_TIMEOUT;
use control_kit::execution_api::RemediateOptions;

use crate::config::{Action, OutputFormat, RunConfig};

/// Windows STIG control checker and remediator
#[derive(Debug, Parser)]
#[command(
    name = "stig_agent",
    version,
    about,
    after_help = "EXIT CODES:\n    0    All selected controls compliant\n    1    One or more controls non-compliant or indeterminate\n    2    Usage or configuration error"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Extra control definitions (TOML file or directory of *.toml)
    #[arg(long, global = true, value_name = "PATH")]
    controls: Option<PathBuf>,

    /// JSON output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Full)]
    format: OutputFormat,

    /// Write the JSON report to this file
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Suppress console output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log progress at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Provider command timeout in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List known controls
    List,
    /// Check controls without changing anything (all controls when none given)
    Check {
        #[arg(value_name = "CONTROL_ID")]
        ids: Vec<String>,
    },
    /// Remediate controls, then re-read to confirm
    Remediate {
        #[arg(value_name = "CONTROL_ID", required = true)]
        ids: Vec<String>,

        /// Write even when the control already passes
        #[arg(long)]
        force: bool,

        /// Also register the control's startup re-application task
        #[arg(long)]
        persist: bool,
    },
}

/// CLI parsing result
pub enum CliResult {
    /// Run with this configuration
    Run(RunConfig),
    /// Help or version text to print before exiting
    Help(String),
    /// Error with message
    Error(String),
}

/// Parse command-line arguments
pub fn parse_args(args: &[String]) -> CliResult {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => CliResult::Help(e.to_string()),
                _ => CliResult::Error(
                    e.to_string()
                        .trim_start_matches("error: ")
                        .trim_end()
                        .to_string(),
                ),
            };
        }
    };

    if let Some(path) = &cli.controls {
        if !path.exists() {
            return CliResult::Error(format!("Path not found: {}", path.display()));
        }
    }

    if cli.timeout == 0 {
        return CliResult::Error("--timeout must be at least 1 second".to_string());
    }

    let action = match cli.command {
        Command::List => Action::List,
        Command::Check { ids } => Action::Check { ids },
        Command::Remediate {
            ids,
            force,
            persist,
        } => Action::Remediate {
            ids,
            options: RemediateOptions { force, persist },
        },
    };

    CliResult::Run(RunConfig {
        action,
        controls_path: cli.controls,
        output_file: cli.output,
        output_format: cli.format,
        quiet: cli.quiet,
        verbose: cli.verbose,
        timeout: Duration::from_secs(cli.timeout),
    })
}
