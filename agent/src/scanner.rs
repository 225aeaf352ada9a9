//! Core control-run logic
//!
//! Selects controls, runs check or remediate on each, and collects reports.

use std::path::{Path, PathBuf};
use std::time::Instant;

use control_kit::contracts::{ControlCatalog, DefinitionError};
use control_kit::execution_api::{
    check_control, remediate_control, ControlReport, ExecutionError, StrategyRegistry,
};

use crate::config::{Action, RunConfig, RunSummary};
use crate::output::{self, RunInfo};
use crate::registry;

/// Run the configured action over the selected controls
pub fn run_controls(config: &RunConfig, catalog: &ControlCatalog) -> Result<i32, ScanError> {
    let start = Instant::now();

    let controls = catalog
        .select(config.action.ids())
        .map_err(ScanError::Definition)?;

    log::info!(
        "Starting {} run over {} control(s)",
        config.action.mode(),
        controls.len()
    );
    if !config.quiet {
        println!();
        println!("STIG Agent v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "{} {} control(s)...",
            match config.action {
                Action::Remediate { .. } => "Remediating",
                _ => "Checking",
            },
            controls.len()
        );
        println!();
    }

    let registry = create_registry(config)?;

    let mut reports: Vec<ControlReport> = Vec::new();
    let mut summary = RunSummary::new(controls.len());

    for (index, control) in controls.iter().enumerate() {
        let num = index + 1;
        let result = match &config.action {
            Action::Remediate { options, .. } => remediate_control(&registry, control, *options),
            _ => check_control(&registry, control),
        };

        match result {
            Ok(report) => {
                if report.passed() {
                    summary.compliant += 1;
                } else {
                    summary.non_compliant += 1;
                }
                if !config.quiet {
                    output::print_progress_result(num, controls.len(), &report);
                }
                reports.push(report);
            }
            Err(e) => {
                summary.errors += 1;
                summary.non_compliant += 1;
                if !config.quiet {
                    println!(
                        "[{}/{}] \x1b[31m✗\x1b[0m {} (ERROR: {})",
                        num,
                        controls.len(),
                        control.id,
                        e
                    );
                }
                log::error!("Control {} failed to run: {}", control.id, e);
            }
        }
    }

    summary.duration = start.elapsed();

    if !config.quiet {
        output::print_results(&reports);
        print_execution_info(&summary, config);
    }

    if config.output_file.is_some() {
        let run = RunInfo::new(config.action.mode());
        let written = save_output(&reports, config, &run)?;
        if let Some(path) = written {
            if !config.quiet {
                println!("Results saved to: {}", path.display());
                println!();
            }
        }
    }

    log::info!(
        "Run completed: total={} compliant={} non_compliant={} errors={}",
        summary.total,
        summary.compliant,
        summary.non_compliant,
        summary.errors
    );

    Ok(summary.exit_code())
}

/// Create the strategy registry
fn create_registry(config: &RunConfig) -> Result<StrategyRegistry, ScanError> {
    registry::create_host_registry(config.timeout).map_err(|e| {
        log::error!("Failed to create strategy registry: {}", e);
        ScanError::Registry(e)
    })
}

/// Resolve the output file, using the format's default name inside a directory
pub fn resolve_output_path(path: &Path, config: &RunConfig) -> PathBuf {
    if path.is_dir() {
        path.join(config.output_format.default_filename())
    } else {
        path.to_path_buf()
    }
}

/// Save output to file, returning the path written
fn save_output(
    reports: &[ControlReport],
    config: &RunConfig,
    run: &RunInfo,
) -> Result<Option<PathBuf>, ScanError> {
    let output_path = match &config.output_file {
        Some(path) => resolve_output_path(path, config),
        None => return Ok(None),
    };

    let json = output::build_output(reports, config.output_format, run).map_err(ScanError::Output)?;

    std::fs::write(&output_path, &json)
        .map_err(|e| ScanError::WriteFile(output_path.display().to_string(), e))?;

    Ok(Some(output_path))
}

/// Print execution information
fn print_execution_info(summary: &RunSummary, config: &RunConfig) {
    println!("────────────────────────────────────────────────────────────────────────────────");
    println!("  Mode:         {}", config.action.mode());
    println!("  Duration:     {:.2}s", summary.duration.as_secs_f64());
    if summary.errors > 0 {
        println!("  Errors:       {}", summary.errors);
    }
    if let Some(output_path) = &config.output_file {
        println!(
            "  Output:       {} ({})",
            output_path.display(),
            config.output_format
        );
    }
    println!("────────────────────────────────────────────────────────────────────────────────");
    println!();
}

/// Errors that can occur during a run
#[derive(Debug)]
pub enum ScanError {
    /// Selected control ids not in the catalog
    Definition(DefinitionError),
    /// Failed to create registry
    Registry(ExecutionError),
    /// Failed to generate output
    Output(output::OutputError),
    /// Failed to write output file
    WriteFile(String, std::io::Error),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Definition(e) => write!(f, "{}", e),
            ScanError::Registry(e) => write!(f, "Registry creation failed: {}", e),
            ScanError::Output(e) => write!(f, "Output generation failed: {}", e),
            ScanError::WriteFile(path, e) => write!(f, "Failed to write {}: {}", path, e),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Definition(e) => Some(e),
            ScanError::Registry(e) => Some(e),
            ScanError::Output(e) => Some(e),
            ScanError::WriteFile(_, e) => Some(e),
        }
    }
}
