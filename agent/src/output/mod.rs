//! Output generation module
//!
//! Provides builders for different output formats:
//! - Full before/after reports with field maps and raw-output digests
//! - Summary (counts and per-control status)
//! - Console (human-readable)
//!
//! Both JSON formats share one envelope header: agent identity, a run id
//! and the generation time.

mod console;
mod full;
mod summary;

pub use console::{print_catalog, print_progress_result, print_results};
pub use full::build_full_result;
pub use summary::build_summary;

use chrono::{DateTime, Utc};
use control_kit::execution_api::ControlReport;
use serde::Serialize;
use uuid::Uuid;

use crate::config::OutputFormat;

pub const AGENT_NAME: &str = "stig_agent";

/// Identity of one agent run
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub mode: &'static str,
}

impl RunInfo {
    pub fn new(mode: &'static str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            mode,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub version: &'static str,
}

pub fn agent_info() -> AgentInfo {
    AgentInfo {
        name: AGENT_NAME,
        version: env!("CARGO_PKG_VERSION"),
    }
}

/// Pass/fail counts over a set of reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
}

impl Totals {
    pub fn from_reports(reports: &[ControlReport]) -> Self {
        let compliant = reports.iter().filter(|r| r.passed()).count();
        Self {
            total: reports.len(),
            compliant,
            non_compliant: reports.len() - compliant,
        }
    }
}

/// Build output in the specified format
pub fn build_output(
    reports: &[ControlReport],
    format: OutputFormat,
    run: &RunInfo,
) -> Result<String, OutputError> {
    let json = match format {
        OutputFormat::Full => serde_json::to_string_pretty(&build_full_result(reports, run)),
        OutputFormat::Summary => serde_json::to_string_pretty(&build_summary(reports, run)),
    };
    json.map_err(|e| OutputError::Serialization(e.to_string()))
}

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during output generation
#[derive(Debug)]
pub enum OutputError {
    /// Failed to serialize result
    Serialization(String),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Serialization(msg) => write!(f, "Failed to serialize output: {}", msg),
        }
    }
}

impl std::error::Error for OutputError {}
