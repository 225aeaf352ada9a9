//! TOML control definitions
//!
//! ```toml
//! [[control]]
//! id = "LOCAL-0001"
//! title = "Consumer experiences off"
//! comparison = { op = "equals", field = "value", expected = 1 }
//!
//! [control.identity]
//! provider = "registry"
//! hive = "HKLM"
//! key_path = 'SOFTWARE\Policies\Microsoft\Windows\CloudContent'
//! value_name = "DisableWindowsConsumerFeatures"
//!
//! [control.remediation]
//! action = "set_registry_value"
//! value = 1
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::{builtin_controls, Control, DefinitionError};

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    #[serde(default, rename = "control")]
    controls: Vec<Control>,
}

/// Parse and validate control definitions from TOML text
pub fn parse_definitions(src: &str, origin: &str) -> Result<Vec<Control>, DefinitionError> {
    let file: DefinitionFile = toml::from_str(src).map_err(|source| DefinitionError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    let mut seen = HashSet::new();
    for control in &file.controls {
        control.validate()?;
        if !seen.insert(control.id.clone()) {
            return Err(DefinitionError::Duplicate(control.id.clone()));
        }
    }

    log::debug!("Parsed {} controls from {}", file.controls.len(), origin);
    Ok(file.controls)
}

/// Load control definitions from one TOML file
pub fn load_definitions(path: &Path) -> Result<Vec<Control>, DefinitionError> {
    let src = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_definitions(&src, &path.display().to_string())
}

/// Ordered set of controls addressable by id
#[derive(Debug, Clone, Default)]
pub struct ControlCatalog {
    controls: Vec<Control>,
}

impl ControlCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the built-in controls
    pub fn builtin() -> Self {
        Self {
            controls: builtin_controls(),
        }
    }

    /// Add controls, replacing any existing control with the same id
    pub fn merge(&mut self, controls: Vec<Control>) {
        for control in controls {
            match self.controls.iter_mut().find(|c| c.id == control.id) {
                Some(existing) => {
                    log::info!("Control {} overridden by definition file", control.id);
                    *existing = control;
                }
                None => self.controls.push(control),
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Controls named by `ids` in the order given, or every control when empty
    pub fn select(&self, ids: &[String]) -> Result<Vec<&Control>, DefinitionError> {
        if ids.is_empty() {
            return Ok(self.controls.iter().collect());
        }
        ids.iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| DefinitionError::UnknownControl(id.clone()))
            })
            .collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::appliers::{PersistenceStrategy, Remediation};
    use crate::normalizers::ReportSchema;
    use crate::types::{AuditFlag, Comparison, FieldValue, RegistryHive, SettingIdentity};

    const REGISTRY_DEF: &str = r#"
[[control]]
id = "LOCAL-0001"
title = "Consumer experiences off"
comparison = { op = "equals", field = "value", expected = 1 }

[control.identity]
provider = "registry"
hive = "HKLM"
key_path = 'SOFTWARE\Policies\Microsoft\Windows\CloudContent'
value_name = "DisableWindowsConsumerFeatures"

[control.remediation]
action = "set_registry_value"
value = 1
"#;

    const AUDIT_DEF: &str = r#"
[[control]]
id = "LOCAL-0002"
title = "Logoff auditing"
schema = "csv_per_flag"
notes = "Local baseline"

[control.identity]
provider = "audit_subcategory"
subcategory = "Logoff"

[control.comparison]
op = "flags_enabled"
flags = ["Success", "Failure"]

[control.remediation]
action = "set_audit_policy"
success = true
failure = true

[control.persistence]
strategy = "startup_task"
task_name = "STIG-Logoff"
"#;

    #[test]
    fn test_parse_registry_definition() {
        let controls = parse_definitions(REGISTRY_DEF, "inline").unwrap();
        assert_eq!(controls.len(), 1);

        let control = &controls[0];
        assert_eq!(
            control.rule.identity,
            SettingIdentity::registry(
                RegistryHive::LocalMachine,
                r"SOFTWARE\Policies\Microsoft\Windows\CloudContent",
                "DisableWindowsConsumerFeatures"
            )
        );
        assert_eq!(
            control.rule.comparison,
            Comparison::Equals {
                field: "value".to_string(),
                expected: FieldValue::Dword(1),
            }
        );
        assert_eq!(control.schema, ReportSchema::Tabular);
        assert_eq!(
            control.remediation,
            Some(Remediation::SetRegistryValue {
                value: FieldValue::Dword(1)
            })
        );
    }

    #[test]
    fn test_parse_audit_definition() {
        let controls = parse_definitions(AUDIT_DEF, "inline").unwrap();
        let control = &controls[0];

        assert_eq!(control.schema, ReportSchema::CsvPerFlag);
        assert_eq!(
            control.rule.comparison,
            Comparison::FlagsEnabled {
                flags: vec![AuditFlag::Success, AuditFlag::Failure]
            }
        );
        assert_eq!(
            control.persistence,
            Some(PersistenceStrategy::StartupTask {
                task_name: "STIG-Logoff".to_string()
            })
        );
        assert_eq!(control.notes.as_deref(), Some("Local baseline"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let doubled = format!("{}\n{}", REGISTRY_DEF, REGISTRY_DEF);
        let err = parse_definitions(&doubled, "inline").unwrap_err();
        assert!(matches!(err, DefinitionError::Duplicate(id) if id == "LOCAL-0001"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse_definitions("[[control]\nid =", "broken.toml").unwrap_err();
        assert!(matches!(err, DefinitionError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_definitions(Path::new("/nonexistent/controls.toml")).unwrap_err();
        assert!(matches!(err, DefinitionError::Io { .. }));
    }

    #[test]
    fn test_merge_overrides_builtin() {
        let mut catalog = ControlCatalog::builtin();
        let before = catalog.len();

        let mut controls = parse_definitions(REGISTRY_DEF, "inline").unwrap();
        controls[0].id = "WN11-CC-000197".to_string();
        controls[0].title = "Overridden".to_string();
        catalog.merge(controls);

        assert_eq!(catalog.len(), before);
        assert_eq!(catalog.get("WN11-CC-000197").unwrap().title, "Overridden");
    }

    #[test]
    fn test_select() {
        let catalog = ControlCatalog::builtin();

        assert_eq!(catalog.select(&[]).unwrap().len(), catalog.len());

        let picked = catalog
            .select(&["wn11-cc-000038".to_string(), "WN11-AU-000560".to_string()])
            .unwrap();
        assert_eq!(picked[0].id, "WN11-CC-000038");
        assert_eq!(picked[1].id, "WN11-AU-000560");

        let err = catalog.select(&["WN11-XX-999999".to_string()]).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownControl(_)));
    }
}
