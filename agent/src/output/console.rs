//! Console output formatting
//!
//! Provides formatted console output for control reports and the catalog.

use control_kit::contracts::Control;
use control_kit::execution_api::{pass_rate, ControlReport, PersistenceOutcome, WriteOutcome};
use control_kit::types::{ComplianceResult, Verdict};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Print control reports to console in a human-readable format
pub fn print_results(reports: &[ControlReport]) {
    if reports.is_empty() {
        return;
    }

    println!();
    println!("╔═══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                             CONTROL RESULTS                                   ║");
    println!("╚═══════════════════════════════════════════════════════════════════════════════╝");
    println!();

    for (index, report) in reports.iter().enumerate() {
        print_control_report(index + 1, reports.len(), report);
    }

    print_summary_table(reports);
}

/// Icon, label and color for a verdict
fn status_parts(verdict: &Verdict) -> (&'static str, &'static str, &'static str) {
    match verdict {
        Verdict::Compliant => ("✓", "PASS", GREEN),
        Verdict::Mismatch { .. } => ("✗", "FAIL", RED),
        Verdict::Indeterminate { .. } => ("?", "INDETERMINATE", YELLOW),
    }
}

fn truncate(line: &str, max: usize) -> String {
    if line.chars().count() > max {
        let head: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

/// Print a single control report
fn print_control_report(num: usize, total: usize, report: &ControlReport) {
    let (icon, text, color) = status_parts(&report.verdict);

    println!("┌───────────────────────────────────────────────────────────────────────────────┐");
    println!("│ Control {}/{}: {}", num, total, report.control_id);
    println!("│ {}", truncate(&report.title, 76));
    println!("├───────────────────────────────────────────────────────────────────────────────┤");
    println!("│ Status:      {}{} {}{}", color, icon, text, RESET);
    if !report.verdict.is_compliant() {
        println!("│              {}", truncate(&report.verdict.to_string(), 64));
    }
    println!("│ Setting:     {}", report.before.rule.identity);
    println!("│ Rule:        {}", report.before.rule.comparison);

    print_observation("Before", &report.before);

    if let Some(write) = &report.write {
        let line = match write {
            WriteOutcome::Applied { receipt } => format!("applied {}", receipt.detail),
            WriteOutcome::Skipped { reason } => format!("skipped ({})", reason),
            WriteOutcome::Failed { error } => format!("{}failed{}: {}", RED, RESET, error),
        };
        println!("│ Write:       {}", line);
    }

    if let Some(persistence) = &report.persistence {
        let line = match persistence {
            PersistenceOutcome::Registered { receipt } => {
                format!("startup task {}", receipt.task_name)
            }
            PersistenceOutcome::Failed { error } => format!("{}failed{}: {}", RED, RESET, error),
        };
        println!("│ Persistence: {}", line);
    }

    if let Some(after) = &report.after {
        print_observation("After", after);
    }

    if let Some(notes) = &report.notes {
        println!("├───────────────────────────────────────────────────────────────────────────────┤");
        println!("│ Note:");
        for line in notes.lines().take(4) {
            println!("│   {}", truncate(line, 74));
        }
    }

    println!("└───────────────────────────────────────────────────────────────────────────────┘");
    println!();
}

/// Print the normalized fields of one read
fn print_observation(label: &str, result: &ComplianceResult) {
    let (icon, _, color) = status_parts(&result.verdict);
    match &result.observed {
        Some(observed) if observed.exists() => {
            let fields: Vec<String> = observed
                .fields()
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            println!(
                "│ {:<12} {}{}{} {}",
                format!("{}:", label),
                color,
                icon,
                RESET,
                truncate(&fields.join(", "), 60)
            );
        }
        Some(_) => println!("│ {:<12} {}{}{} (absent)", format!("{}:", label), color, icon, RESET),
        None => println!(
            "│ {:<12} {}{}{} (no observation)",
            format!("{}:", label),
            color,
            icon,
            RESET
        ),
    }
}

/// Print summary table
fn print_summary_table(reports: &[ControlReport]) {
    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed()).count();
    let mismatched = reports
        .iter()
        .filter(|r| matches!(r.verdict, Verdict::Mismatch { .. }))
        .count();
    let indeterminate = total - passed - mismatched;
    let remediated = reports.iter().filter(|r| r.after.is_some()).count();

    let pass_rate = pass_rate(reports);

    println!("╔═══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                                 SUMMARY                                       ║");
    println!("╠═══════════════════════════════════════════════════════════════════════════════╣");
    println!("║                                                                               ║");
    println!(
        "║   Total Controls:  {:3}                                                        ║",
        total
    );
    println!("║   \x1b[32mCompliant:\x1b[0m       {:3}                                                        ║", passed);
    println!("║   \x1b[31mMismatch:\x1b[0m        {:3}                                                        ║", mismatched);
    println!("║   \x1b[33mIndeterminate:\x1b[0m   {:3}                                                        ║", indeterminate);
    if remediated > 0 {
        println!(
            "║   Remediated:      {:3}                                                        ║",
            remediated
        );
    }
    println!("║                                                                               ║");
    println!("╠═══════════════════════════════════════════════════════════════════════════════╣");
    println!(
        "║   Pass Rate: {:5.1}%                                                          ║",
        pass_rate
    );
    println!("╚═══════════════════════════════════════════════════════════════════════════════╝");
    println!();
}

/// Print a compact single-line result for progress output
pub fn print_progress_result(num: usize, total: usize, report: &ControlReport) {
    let (icon, _, color) = status_parts(&report.verdict);

    println!(
        "[{}/{}] {}{}{} {}",
        num, total, color, icon, RESET, report.control_id
    );
    if !report.passed() {
        println!("       └─ {}", truncate(&report.verdict.to_string(), 70));
    }
}

/// Print the control catalog, one line per control
pub fn print_catalog(controls: &[Control]) {
    println!();
    println!("{:<16} {:<10} {:<12} TITLE", "ID", "PROVIDER", "REMEDIATION");
    println!("────────────────────────────────────────────────────────────────────────────────");
    for control in controls {
        let remediation = match (&control.remediation, &control.persistence) {
            (Some(_), Some(_)) => "write+task",
            (Some(_), None) => "write",
            (None, _) => "-",
        };
        println!(
            "{:<16} {:<10} {:<12} {}",
            control.id,
            control.rule.identity.kind().to_string(),
            remediation,
            truncate(&control.title, 40)
        );
    }
    println!();
    println!("{} control(s)", controls.len());
    println!();
}
