//! Per-flag state
//!
//! Each required flag's column must read exactly "Enabled".

use super::required_field;
use crate::types::{AuditFlag, FailureKind, FieldValue, ObservedState, Verdict, FLAG_ENABLED};

pub fn check(observed: &ObservedState, flags: &[AuditFlag]) -> Verdict {
    if flags.is_empty() {
        return Verdict::indeterminate(FailureKind::ParseFailure, "rule requires no flags");
    }

    let mut states = Vec::with_capacity(flags.len());
    let mut all_enabled = true;

    for flag in flags {
        let state = match required_field(observed, flag.field_name()) {
            Ok(FieldValue::String(s)) => s.as_str(),
            Ok(other) => {
                return Verdict::indeterminate(
                    FailureKind::ParseFailure,
                    format!("{} column is not text: {}", flag, other),
                )
            }
            Err(verdict) => return verdict,
        };
        all_enabled &= state == FLAG_ENABLED;
        states.push(format!("{}={}", flag, state));
    }

    if all_enabled {
        Verdict::Compliant
    } else {
        let names: Vec<&str> = flags.iter().map(|f| f.as_str()).collect();
        Verdict::Mismatch {
            expected: format!("{} {}", names.join(" and "), FLAG_ENABLED),
            actual: states.join(", "),
        }
    }
}
