//! Resultant set of policy dump (`gpresult /z`)
//!
//! The dump is verbose and loosely structured. A policy entry is located by
//! substring match on its name, then its effective state is read either
//! from the same line or from the first labelled state line that follows
//! within the same entry:
//!
//! ```text
//!         GPO: Local Group Policy
//!             Policy:            Turn off Microsoft consumer experiences
//!             Computer Setting:  Enabled
//! ```

use super::{NormalizeError, NormalizedRecord};
use crate::types::FieldValue;

/// Effective state texts reported by the dump
pub const STATE_ENABLED: &str = "Enabled";
pub const STATE_DISABLED: &str = "Disabled";
pub const STATE_NOT_CONFIGURED: &str = "Not Configured";

/// Lines after the policy name searched for its state
const STATE_LOOKAHEAD: usize = 3;

/// Labels that introduce a state value
const STATE_LABELS: &[&str] = &["state", "computer setting", "setting"];

/// Labels that open the next policy entry
const ENTRY_LABELS: &[&str] = &["policy", "gpo"];

/// Map free text onto one of the known state words
fn classify_state(text: &str) -> Option<&'static str> {
    let lower = text.to_ascii_lowercase();
    if lower.contains("not configured") {
        Some(STATE_NOT_CONFIGURED)
    } else if lower.contains("disabled") {
        Some(STATE_DISABLED)
    } else if lower.contains("enabled") {
        Some(STATE_ENABLED)
    } else {
        None
    }
}

/// Value of a `Label: value` line when the label introduces a state
fn labelled_state(line: &str) -> Option<String> {
    let (label, value) = line.split_once(':')?;
    let label = label.trim().to_ascii_lowercase();
    if STATE_LABELS.contains(&label.as_str()) {
        Some(value.trim().to_string())
    } else {
        None
    }
}

/// Whether `line` starts another policy entry
fn starts_entry(line: &str) -> bool {
    line.split_once(':')
        .map(|(label, _)| ENTRY_LABELS.contains(&label.trim().to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Extract the effective state of `policy_name` from a resultant policy dump
pub fn parse_policy_state(dump: &str, policy_name: &str) -> Result<NormalizedRecord, NormalizeError> {
    let needle = policy_name.trim().to_ascii_lowercase();
    let lines: Vec<&str> = dump.lines().collect();

    let position = lines
        .iter()
        .position(|l| l.to_ascii_lowercase().contains(&needle))
        .ok_or_else(|| NormalizeError::NoMatch(policy_name.to_string()))?;

    let name_line = lines.get(position).copied().unwrap_or_default();
    let name_offset = name_line.to_ascii_lowercase().find(&needle).unwrap_or(0);
    let trailing = name_line.get(name_offset + needle.len()..).unwrap_or_default();

    let state = classify_state(trailing)
        .map(str::to_string)
        .or_else(|| {
            lines
                .iter()
                .skip(position + 1)
                .take(STATE_LOOKAHEAD)
                .take_while(|l| !starts_entry(l))
                .find_map(|l| labelled_state(l))
                .map(|value| {
                    classify_state(&value)
                        .map(str::to_string)
                        .unwrap_or(value)
                })
        })
        .ok_or_else(|| {
            NormalizeError::Malformed(format!("no state reported for '{}'", policy_name))
        })?;

    let mut record = NormalizedRecord::new();
    record.insert(
        "policy".to_string(),
        FieldValue::String(policy_name.to_string()),
    );
    record.insert("state".to_string(), FieldValue::String(state));
    Ok(record)
}
