//! Full result builder
//!
//! Every control report with its before/after observations. Observations
//! carry their normalized field map and a SHA-256 digest of the raw
//! provider output.

use chrono::{DateTime, Utc};
use control_kit::execution_api::ControlReport;
use serde::Serialize;
use uuid::Uuid;

use super::{agent_info, AgentInfo, RunInfo, Totals};

#[derive(Debug, Serialize)]
pub struct FullResult<'a> {
    pub agent: AgentInfo,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub mode: &'static str,
    pub summary: Totals,
    pub controls: &'a [ControlReport],
}

/// Build a unified FullResult containing all control reports in a single envelope
pub fn build_full_result<'a>(reports: &'a [ControlReport], run: &RunInfo) -> FullResult<'a> {
    FullResult {
        agent: agent_info(),
        run_id: run.run_id,
        generated_at: run.generated_at,
        mode: run.mode,
        summary: Totals::from_reports(reports),
        controls: reports,
    }
}
