//! Exact equality
//!
//! Typed compare: a DWORD only equals a DWORD, a string only equals the
//! identical string.

use super::required_field;
use crate::types::{FieldValue, ObservedState, Verdict};

pub fn check(observed: &ObservedState, field: &str, expected: &FieldValue) -> Verdict {
    let actual = match required_field(observed, field) {
        Ok(value) => value,
        Err(verdict) => return verdict,
    };

    if actual == expected {
        Verdict::Compliant
    } else {
        Verdict::Mismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
