//! Tabular `auditpol /get` output
//!
//! ```text
//! System audit policy
//! Category/Subcategory                      Setting
//! Logon/Logoff
//!   Other Logon/Logoff Events               Success and Failure
//! ```
//!
//! Columns are separated by runs of two or more whitespace characters;
//! single spaces belong to the value ("Success and Failure").

use std::sync::OnceLock;

use regex::Regex;

use super::{names_match, NormalizeError, NormalizedRecord};
use crate::types::FieldValue;

fn column_separator() -> Result<&'static Regex, NormalizeError> {
    static SEPARATOR: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    SEPARATOR
        .get_or_init(|| Regex::new(r"\s{2,}"))
        .as_ref()
        .map_err(|e| NormalizeError::Malformed(e.to_string()))
}

/// Split one line into trimmed columns
pub fn split_columns(line: &str) -> Result<Vec<String>, NormalizeError> {
    let separator = column_separator()?;
    Ok(separator
        .split(line.trim())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parse one line into `(name, setting)`
///
/// The first column is the name; every remaining column is joined into
/// the setting text.
pub fn parse_line(line: &str) -> Result<(String, String), NormalizeError> {
    let columns = split_columns(line)?;
    match columns.split_first() {
        Some((name, rest)) if !rest.is_empty() => Ok((name.clone(), rest.join(" "))),
        _ => Err(NormalizeError::TooFewColumns {
            expected: 2,
            found: columns.len(),
        }),
    }
}

/// Find the line for `target` and normalize it
pub fn normalize(raw: &str, target: &str) -> Result<NormalizedRecord, NormalizeError> {
    let separator = column_separator()?;

    let line = raw
        .lines()
        .filter(|l| !l.trim().is_empty())
        .find(|l| {
            separator
                .split(l.trim())
                .next()
                .map(|first| names_match(first, target))
                .unwrap_or(false)
        })
        .ok_or_else(|| NormalizeError::NoMatch(target.to_string()))?;

    let (name, setting) = parse_line(line)?;

    let mut record = NormalizedRecord::new();
    record.insert("name".to_string(), FieldValue::String(name));
    record.insert("setting".to_string(), FieldValue::String(setting));
    Ok(record)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const AUDITPOL_GET: &str = "System audit policy\r\n\
Category/Subcategory                      Setting\r\n\
Logon/Logoff\r\n\
  Other Logon/Logoff Events               Success and Failure\r\n";

    #[test]
    fn test_parse_line_collapses_whitespace() {
        let (name, setting) =
            parse_line("Other Logon/Logoff Events               Success and Failure").unwrap();
        assert_eq!(name, "Other Logon/Logoff Events");
        assert_eq!(setting, "Success and Failure");
    }

    #[test]
    fn test_parse_line_with_tabs() {
        let (name, setting) = parse_line("  Credential Validation\t\tNo Auditing  ").unwrap();
        assert_eq!(name, "Credential Validation");
        assert_eq!(setting, "No Auditing");
    }

    #[test]
    fn test_parse_line_requires_setting_column() {
        let err = parse_line("Logon/Logoff").unwrap_err();
        assert_eq!(
            err,
            NormalizeError::TooFewColumns {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_normalize_finds_target_line() {
        let record = normalize(AUDITPOL_GET, "Other Logon/Logoff Events").unwrap();
        assert_eq!(
            record.get("name"),
            Some(&FieldValue::String("Other Logon/Logoff Events".to_string()))
        );
        assert_eq!(
            record.get("setting"),
            Some(&FieldValue::String("Success and Failure".to_string()))
        );
    }

    #[test]
    fn test_normalize_is_case_insensitive_on_name() {
        let record = normalize(AUDITPOL_GET, "other logon/logoff events").unwrap();
        assert!(record.contains_key("setting"));
    }

    #[test]
    fn test_normalize_missing_subcategory() {
        let err = normalize(AUDITPOL_GET, "Credential Validation").unwrap_err();
        assert_eq!(
            err,
            NormalizeError::NoMatch("Credential Validation".to_string())
        );
    }

    #[test]
    fn test_category_line_does_not_match_subcategory() {
        // "Logon/Logoff" is a category header with no setting column
        let err = normalize(AUDITPOL_GET, "Logon/Logoff").unwrap_err();
        assert!(matches!(err, NormalizeError::TooFewColumns { .. }));
    }
}
