//! # STIG Agent
//!
//! Checks and remediates Windows STIG controls against the live host.
//!
//! ## Usage
//!
//! ```bash
//! # List known controls
//! stig_agent list
//!
//! # Check every control
//! stig_agent check
//!
//! # Remediate one control and keep it in force across restarts
//! stig_agent remediate WN11-AU-000560 --persist
//!
//! # Add site-specific controls and save a summary report
//! stig_agent check --controls site/ --format summary -o report.json
//! ```
//!
//! ## Output Formats
//!
//! - **full** (default): Before/after reports with field maps and raw-output digests
//! - **summary**: Minimal output with pass/fail counts only
//!
//! Both formats produce a single envelope containing all selected controls.

mod cli;
mod config;
mod discovery;
mod output;
mod registry;
mod scanner;

use cli::{parse_args, CliResult};
use config::{Action, RunConfig};
use control_kit::contracts::{load_definitions, ControlCatalog};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let exit_code = match parse_args(&args) {
        CliResult::Help(text) => {
            print!("{}", text);
            0
        }
        CliResult::Error(msg) => {
            eprintln!("Error: {}", msg);
            2
        }
        CliResult::Run(config) => {
            if let Err(e) = init_logging(config.verbose) {
                eprintln!("Failed to initialize logging: {}", e);
                std::process::exit(2);
            }
            match run(config) {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    2
                }
            }
        }
    };

    std::process::exit(exit_code);
}

/// Initialize logging; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) -> Result<(), log::SetLoggerError> {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init()
}

/// Build the catalog and run the configured action
fn run(config: RunConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let catalog = build_catalog(&config)?;

    if config.action == Action::List {
        output::print_catalog(catalog.controls());
        return Ok(0);
    }

    let exit_code = scanner::run_controls(&config, &catalog)?;

    Ok(exit_code)
}

/// Built-in controls, overridden or extended by definition files
fn build_catalog(config: &RunConfig) -> Result<ControlCatalog, Box<dyn std::error::Error>> {
    let mut catalog = ControlCatalog::builtin();

    if let Some(path) = &config.controls_path {
        let files = discovery::discover_control_files(path)?;
        if files.is_empty() && !config.quiet {
            println!("No control definition files found in: {}", path.display());
        }
        for file in files {
            log::info!("Loading control definitions from {}", file.display());
            catalog.merge(load_definitions(&file)?);
        }
    }

    Ok(catalog)
}
