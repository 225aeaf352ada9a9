//! Delimited `auditpol /get /r` reports
//!
//! Both report schemas share the leading columns
//! `Machine Name, Policy Target, Subcategory, Subcategory GUID` and differ
//! after that:
//!
//! - inclusion style: `Inclusion Setting, Exclusion Setting` phrases
//! - per-flag style: `Success, Failure` columns holding `Enabled`/`Disabled`
//!
//! The last data row is the one normalized.

use ::csv::{ReaderBuilder, Trim};

use super::{names_match, NormalizeError, NormalizedRecord};
use crate::types::{AuditFlag, FieldValue, FLAG_DISABLED, FLAG_ENABLED};

const COL_SUBCATEGORY: usize = 2;
const COL_GUID: usize = 3;
const COL_INCLUSION: usize = 4;
const COL_EXCLUSION: usize = 5;
const COL_SUCCESS: usize = 4;
const COL_FAILURE: usize = 5;

/// Minimum columns for an inclusion-style row (exclusion may be omitted)
pub const INCLUSION_MIN_COLUMNS: usize = 5;
/// Minimum columns for a per-flag row
pub const PER_FLAG_MIN_COLUMNS: usize = 6;

fn clean_field(field: &str) -> String {
    field.trim().trim_matches('"').trim().to_string()
}

fn is_header(fields: &[String]) -> bool {
    fields
        .first()
        .map(|f| f.eq_ignore_ascii_case("Machine Name"))
        .unwrap_or(false)
}

/// Last non-header, non-empty row of the report
fn last_data_row(raw: &str) -> Result<Option<Vec<String>>, NormalizeError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());

    let mut last = None;
    for record in reader.records() {
        let record = record.map_err(|e| NormalizeError::Malformed(e.to_string()))?;
        let fields: Vec<String> = record.iter().map(clean_field).collect();

        if fields.iter().all(|f| f.is_empty()) || is_header(&fields) {
            continue;
        }
        last = Some(fields);
    }

    Ok(last)
}

/// Pick the row for `target`, enforcing the minimum column count
fn target_row(raw: &str, target: &str, min_columns: usize) -> Result<Vec<String>, NormalizeError> {
    let row = last_data_row(raw)?.ok_or_else(|| NormalizeError::NoMatch(target.to_string()))?;

    if row.len() < min_columns {
        return Err(NormalizeError::TooFewColumns {
            expected: min_columns,
            found: row.len(),
        });
    }

    let name = row.get(COL_SUBCATEGORY).map(String::as_str).unwrap_or("");
    if !names_match(name, target) {
        return Err(NormalizeError::NoMatch(target.to_string()));
    }

    Ok(row)
}

fn column(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

/// Flag state implied by an inclusion phrase such as "Success and Failure"
pub fn flag_state_from_phrase(phrase: &str, flag: AuditFlag) -> &'static str {
    if phrase.contains(flag.as_str()) {
        FLAG_ENABLED
    } else {
        FLAG_DISABLED
    }
}

/// Normalize an inclusion/exclusion-style report row
pub fn normalize_inclusion(raw: &str, target: &str) -> Result<NormalizedRecord, NormalizeError> {
    let row = target_row(raw, target, INCLUSION_MIN_COLUMNS)?;
    let inclusion = column(&row, COL_INCLUSION);

    let mut record = NormalizedRecord::new();
    record.insert(
        "name".to_string(),
        FieldValue::String(column(&row, COL_SUBCATEGORY)),
    );
    record.insert("guid".to_string(), FieldValue::String(column(&row, COL_GUID)));
    for flag in [AuditFlag::Success, AuditFlag::Failure] {
        record.insert(
            flag.field_name().to_string(),
            FieldValue::String(flag_state_from_phrase(&inclusion, flag).to_string()),
        );
    }
    record.insert(
        "exclusion_setting".to_string(),
        FieldValue::String(column(&row, COL_EXCLUSION)),
    );
    record.insert(
        "inclusion_setting".to_string(),
        FieldValue::String(inclusion),
    );
    Ok(record)
}

/// Normalize a per-flag report row
pub fn normalize_per_flag(raw: &str, target: &str) -> Result<NormalizedRecord, NormalizeError> {
    let row = target_row(raw, target, PER_FLAG_MIN_COLUMNS)?;

    let mut record = NormalizedRecord::new();
    record.insert(
        "name".to_string(),
        FieldValue::String(column(&row, COL_SUBCATEGORY)),
    );
    record.insert("guid".to_string(), FieldValue::String(column(&row, COL_GUID)));
    record.insert(
        AuditFlag::Success.field_name().to_string(),
        FieldValue::String(column(&row, COL_SUCCESS)),
    );
    record.insert(
        AuditFlag::Failure.field_name().to_string(),
        FieldValue::String(column(&row, COL_FAILURE)),
    );
    Ok(record)
}
