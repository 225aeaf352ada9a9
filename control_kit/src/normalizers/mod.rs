//! # Normalizers Module
//!
//! Turns whitespace-irregular provider text into a field map.
//!
//! The report mode is declared, never guessed from content: tabular
//! `auditpol /get` output, `auditpol /get /r` inclusion-style CSV and
//! per-flag CSV are NOT column-compatible and each has its own schema.
//!
//! | Schema | Fields |
//! |--------|--------|
//! | `Tabular` | `name`, `setting` |
//! | `CsvInclusion` | `name`, `guid`, `inclusion_setting`, `exclusion_setting`, `success`, `failure` |
//! | `CsvPerFlag` | `name`, `guid`, `success`, `failure` |

pub mod delimited;
pub mod resultant;
pub mod tabular;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{FailureKind, FieldValue};

pub use resultant::parse_policy_state;

/// Normalized key/value record
pub type NormalizedRecord = BTreeMap<String, FieldValue>;

/// Provider report layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSchema {
    /// Name followed by a free-form phrase ("Success and Failure")
    #[default]
    Tabular,
    /// CSV with inclusion and exclusion setting phrases
    CsvInclusion,
    /// CSV with one Enabled/Disabled column per flag
    CsvPerFlag,
}

impl ReportSchema {
    /// Whether the provider must be asked for its report (`/r`) form
    pub fn is_report(&self) -> bool {
        !matches!(self, ReportSchema::Tabular)
    }
}

/// Why provider text could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },

    #[error("no entry for '{0}' in provider output")]
    NoMatch(String),

    #[error("malformed provider output: {0}")]
    Malformed(String),
}

impl NormalizeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            NormalizeError::NoMatch(_) => FailureKind::NotFound,
            NormalizeError::TooFewColumns { .. } | NormalizeError::Malformed(_) => {
                FailureKind::ParseFailure
            }
        }
    }
}

/// Normalize audit policy output for `target` with the declared schema
pub fn normalize_audit_output(
    schema: ReportSchema,
    raw: &str,
    target: &str,
) -> Result<NormalizedRecord, NormalizeError> {
    match schema {
        ReportSchema::Tabular => tabular::normalize(raw, target),
        ReportSchema::CsvInclusion => delimited::normalize_inclusion(raw, target),
        ReportSchema::CsvPerFlag => delimited::normalize_per_flag(raw, target),
    }
}

/// Case-insensitive, whitespace-trimmed name comparison
pub(crate) fn names_match(candidate: &str, target: &str) -> bool {
    candidate.trim().eq_ignore_ascii_case(target.trim())
}
