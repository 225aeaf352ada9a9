//! Summary builder
//!
//! Builds minimal summary output with pass/fail counts.

use control_kit::execution_api::ControlReport;

use super::{agent_info, RunInfo, Totals};

/// Build a unified summary JSON from all control reports
pub fn build_summary(reports: &[ControlReport], run: &RunInfo) -> serde_json::Value {
    let controls: Vec<serde_json::Value> = reports.iter().map(build_control_summary).collect();

    serde_json::json!({
        "agent": agent_info(),
        "run_id": run.run_id,
        "generated_at": run.generated_at,
        "mode": run.mode,
        "summary": Totals::from_reports(reports),
        "controls": controls
    })
}

/// Build summary for a single control
fn build_control_summary(report: &ControlReport) -> serde_json::Value {
    serde_json::json!({
        "control_id": report.control_id,
        "passed": report.passed(),
        "failure": report.verdict.failure_kind(),
        "remediated": report.after.is_some()
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_summary_counts() {
        let reports = [fixtures::passing(), fixtures::failing()];
        let json = build_summary(&reports, &RunInfo::new("check"));

        assert_eq!(json["mode"], "check");
        assert_eq!(json["summary"]["compliant"], 1);
        assert_eq!(json["summary"]["non_compliant"], 1);
        assert_eq!(json["controls"][0]["passed"], true);
        assert!(json["controls"][0]["failure"].is_null());
        assert_eq!(json["controls"][1]["failure"], "provider_unavailable");
        assert!(json["controls"][1].get("fields").is_none());
    }
}
