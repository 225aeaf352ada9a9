//! Keyword containment
//!
//! Weaker than the flag-state rule: "Success and Failure" satisfies a
//! "Success" requirement.

use super::required_field;
use crate::types::{FailureKind, FieldValue, ObservedState, Verdict};

pub fn check(observed: &ObservedState, field: &str, keyword: &str) -> Verdict {
    let text = match required_field(observed, field) {
        Ok(FieldValue::String(text)) => text,
        Ok(other) => {
            return Verdict::indeterminate(
                FailureKind::ParseFailure,
                format!("field '{}' is not text: {}", field, other),
            )
        }
        Err(verdict) => return verdict,
    };

    if text.contains(keyword) {
        Verdict::Compliant
    } else {
        Verdict::Mismatch {
            expected: format!("contains \"{}\"", keyword),
            actual: format!("\"{}\"", text),
        }
    }
}
