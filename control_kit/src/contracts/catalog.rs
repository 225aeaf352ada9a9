//! Built-in Windows 11 STIG controls

use super::Control;
use crate::appliers::{PersistenceStrategy, Remediation};
use crate::collectors::registry::VALUE_FIELD;
use crate::normalizers::resultant::STATE_ENABLED;
use crate::normalizers::ReportSchema;
use crate::types::{AuditFlag, Comparison, DesiredStateRule, FieldValue, RegistryHive, SettingIdentity};

const OTHER_LOGON_LOGOFF: &str = "Other Logon/Logoff Events";
const CREDENTIAL_VALIDATION: &str = "Credential Validation";

/// Registry value that must equal a DWORD, remediated by writing it
fn registry_dword(id: &str, title: &str, key_path: &str, value_name: &str, expected: u32) -> Control {
    Control::new(
        id,
        title,
        DesiredStateRule::new(
            SettingIdentity::registry(RegistryHive::LocalMachine, key_path, value_name),
            Comparison::Equals {
                field: VALUE_FIELD.to_string(),
                expected: FieldValue::Dword(expected),
            },
        ),
    )
    .with_remediation(Remediation::SetRegistryValue {
        value: FieldValue::Dword(expected),
    })
}

fn startup_task(id: &str) -> PersistenceStrategy {
    PersistenceStrategy::StartupTask {
        task_name: format!("STIG-{}", id),
    }
}

pub fn audit_controls() -> Vec<Control> {
    vec![
        Control::new(
            "WN11-AU-000560",
            "Windows 11 must be configured to audit Other Logon/Logoff Events Successes",
            DesiredStateRule::new(
                SettingIdentity::audit_subcategory(OTHER_LOGON_LOGOFF),
                Comparison::Contains {
                    field: "setting".to_string(),
                    keyword: AuditFlag::Success.as_str().to_string(),
                },
            ),
        )
        .with_schema(ReportSchema::Tabular)
        .with_remediation(Remediation::SetAuditPolicy {
            success: Some(true),
            failure: None,
        })
        .with_persistence(startup_task("WN11-AU-000560"))
        .with_notes(
            "Containment check only: \"Success and Failure\" passes. Remediation variants for \
             this control disagree on whether Failure must also be enabled; see WN11-AU-000565.",
        ),
        Control::new(
            "WN11-AU-000565",
            "Windows 11 must be configured to audit Other Logon/Logoff Events Failures",
            DesiredStateRule::new(
                SettingIdentity::audit_subcategory(OTHER_LOGON_LOGOFF),
                Comparison::Contains {
                    field: "setting".to_string(),
                    keyword: AuditFlag::Failure.as_str().to_string(),
                },
            ),
        )
        .with_schema(ReportSchema::Tabular)
        .with_remediation(Remediation::SetAuditPolicy {
            success: None,
            failure: Some(true),
        })
        .with_persistence(startup_task("WN11-AU-000565")),
        Control::new(
            "WN11-AU-000005",
            "Windows 11 must be configured to audit Account Logon - Credential Validation failures",
            DesiredStateRule::new(
                SettingIdentity::audit_subcategory(CREDENTIAL_VALIDATION),
                Comparison::FlagsEnabled {
                    flags: vec![AuditFlag::Failure],
                },
            ),
        )
        .with_schema(ReportSchema::CsvInclusion)
        .with_remediation(Remediation::SetAuditPolicy {
            success: None,
            failure: Some(true),
        }),
        Control::new(
            "WN11-AU-000010",
            "Windows 11 must be configured to audit Account Logon - Credential Validation successes",
            DesiredStateRule::new(
                SettingIdentity::audit_subcategory(CREDENTIAL_VALIDATION),
                Comparison::FlagsEnabled {
                    flags: vec![AuditFlag::Success],
                },
            ),
        )
        .with_schema(ReportSchema::CsvInclusion)
        .with_remediation(Remediation::SetAuditPolicy {
            success: Some(true),
            failure: None,
        }),
    ]
}

pub fn registry_controls() -> Vec<Control> {
    vec![
        registry_dword(
            "WN11-CC-000197",
            "Microsoft consumer experiences must be turned off",
            r"SOFTWARE\Policies\Microsoft\Windows\CloudContent",
            "DisableWindowsConsumerFeatures",
            1,
        ),
        registry_dword(
            "WN11-CC-000038",
            "WDigest Authentication must be disabled",
            r"SYSTEM\CurrentControlSet\Control\SecurityProviders\Wdigest",
            "UseLogonCredential",
            0,
        ),
        registry_dword(
            "WN11-CC-000326",
            "PowerShell script block logging must be enabled",
            r"SOFTWARE\Policies\Microsoft\Windows\PowerShell\ScriptBlockLogging",
            "EnableScriptBlockLogging",
            1,
        ),
        registry_dword(
            "WN11-CC-000180",
            "Autoplay must be turned off for non-volume devices",
            r"SOFTWARE\Policies\Microsoft\Windows\Explorer",
            "NoAutoplayfornonVolume",
            1,
        ),
        registry_dword(
            "WN11-SO-000245",
            "User Account Control approval mode for the built-in Administrator must be enabled",
            r"SOFTWARE\Microsoft\Windows\CurrentVersion\Policies\System",
            "FilterAdministratorToken",
            1,
        ),
    ]
}

/// Checked through the resultant policy dump only; there is no remediation
pub fn resultant_controls() -> Vec<Control> {
    vec![Control::new(
        "WN11-CC-000190",
        "Autoplay must be disabled for all drives",
        DesiredStateRule::new(
            SettingIdentity::resultant_policy("Turn off Autoplay"),
            Comparison::Equals {
                field: "state".to_string(),
                expected: FieldValue::String(STATE_ENABLED.to_string()),
            },
        ),
    )]
}

/// Every control compiled into the crate
pub fn builtin_controls() -> Vec<Control> {
    let mut controls = audit_controls();
    controls.extend(registry_controls());
    controls.extend(resultant_controls());
    controls
}
