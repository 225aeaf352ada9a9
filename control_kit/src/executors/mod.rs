//! # Executors Module
//!
//! Executors judge an observation against a desired-state rule:
//! - equality: registry DWORD/string values, resultant policy state
//! - containment: free-form audit setting phrases ("Success and Failure")
//! - flag_state: per-flag Enabled/Disabled columns
//!
//! Every path is fail-closed. An absent setting, a field missing from the
//! normalized record, or an observation of a different setting is never
//! compliant.

pub mod containment;
pub mod equality;
pub mod flag_state;

use crate::collectors::CollectionError;
use crate::types::{
    ComplianceResult, Comparison, DesiredStateRule, FailureKind, FieldValue, ObservedState,
    Verdict,
};

/// Evaluate `rule` against one observation
pub fn evaluate(rule: &DesiredStateRule, observed: &ObservedState) -> ComplianceResult {
    let verdict = judge(rule, observed);
    ComplianceResult::new(rule.clone(), Some(observed.clone()), verdict)
}

/// Evaluate `rule` against the outcome of a read, successful or not
pub fn evaluate_collection(
    rule: &DesiredStateRule,
    collected: Result<ObservedState, CollectionError>,
) -> ComplianceResult {
    match collected {
        Ok(observed) => {
            let verdict = judge(rule, &observed);
            ComplianceResult::new(rule.clone(), Some(observed), verdict)
        }
        Err(e) => {
            log::warn!("Could not determine state of {}: {}", rule.identity, e);
            ComplianceResult::unobserved(rule.clone(), e.kind(), e.to_string())
        }
    }
}

fn judge(rule: &DesiredStateRule, observed: &ObservedState) -> Verdict {
    if observed.identity() != &rule.identity {
        return Verdict::indeterminate(
            FailureKind::NotFound,
            format!(
                "observation of {} cannot satisfy a rule for {}",
                observed.identity(),
                rule.identity
            ),
        );
    }

    if !observed.exists() {
        return Verdict::indeterminate(
            FailureKind::NotFound,
            format!("{} does not exist", rule.identity),
        );
    }

    match &rule.comparison {
        Comparison::Equals { field, expected } => equality::check(observed, field, expected),
        Comparison::Contains { field, keyword } => containment::check(observed, field, keyword),
        Comparison::FlagsEnabled { flags } => flag_state::check(observed, flags),
    }
}

/// Look up a field the rule depends on
pub(crate) fn required_field<'a>(
    observed: &'a ObservedState,
    field: &str,
) -> Result<&'a FieldValue, Verdict> {
    observed.field(field).ok_or_else(|| {
        Verdict::indeterminate(
            FailureKind::ParseFailure,
            format!("field '{}' missing from {}", field, observed.identity()),
        )
    })
}
