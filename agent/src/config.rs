//! Configuration types for the STIG agent
//!
//! Defines the configuration structures used throughout the agent.

use std::path::PathBuf;
use std::time::Duration;

use control_kit::execution_api::RemediateOptions;

/// Output format for the JSON report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Summary only (counts and per-control status)
    Summary,
    /// Full before/after reports with field maps and raw-output digests
    Full,
}

impl OutputFormat {
    /// Get the default output filename for this format
    pub fn default_filename(&self) -> &'static str {
        match self {
            OutputFormat::Summary => "summary.json",
            OutputFormat::Full => "results.json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Summary => write!(f, "summary"),
            OutputFormat::Full => write!(f, "full"),
        }
    }
}

/// What the run does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print the control catalog
    List,
    /// Read and judge, never write
    Check { ids: Vec<String> },
    /// Read, write when needed, re-read
    Remediate {
        ids: Vec<String>,
        options: RemediateOptions,
    },
}

impl Action {
    /// Short name used in reports
    pub fn mode(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Check { .. } => "check",
            Action::Remediate { .. } => "remediate",
        }
    }

    /// Control ids selected on the command line
    pub fn ids(&self) -> &[String] {
        match self {
            Action::List => &[],
            Action::Check { ids } | Action::Remediate { ids, .. } => ids,
        }
    }
}

/// Configuration for one agent run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub action: Action,

    /// Extra control definitions (TOML file or directory)
    pub controls_path: Option<PathBuf>,

    /// Output file path (None means console-only output)
    pub output_file: Option<PathBuf>,

    /// Output format
    pub output_format: OutputFormat,

    /// Suppress progress output
    pub quiet: bool,

    /// Log at info level
    pub verbose: bool,

    /// Per-command provider timeout
    pub timeout: Duration,
}

/// Result of a run
#[derive(Debug)]
pub struct RunSummary {
    /// Controls selected
    pub total: usize,

    /// Controls whose final verdict is compliant
    pub compliant: usize,

    /// Controls that are non-compliant or indeterminate
    pub non_compliant: usize,

    /// Controls that could not be run at all, also counted as non-compliant
    pub errors: usize,

    pub duration: Duration,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            compliant: 0,
            non_compliant: 0,
            errors: 0,
            duration: Duration::ZERO,
        }
    }

    /// Get the exit code based on results
    ///
    /// Exit code 2 is reserved for usage and definition errors raised
    /// before any control runs.
    pub fn exit_code(&self) -> i32 {
        if self.non_compliant > 0 {
            1
        } else {
            0
        }
    }
}
