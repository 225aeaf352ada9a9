//! Startup re-application
//!
//! Some audit settings are reverted at boot by legacy category policy. A
//! control can ask for its remediation to be registered as a task that runs
//! as SYSTEM at every start. Registration is separate from the immediate
//! write and never replaces the re-read.

use serde::{Deserialize, Serialize};

use super::audit_policy::build_set_args;
use super::{ApplyError, Remediation};
use crate::commands::hardening::{AUDITPOL, SCHTASKS};
use crate::commands::CommandRunner;
use crate::types::{FieldValue, SettingIdentity};

/// How a remediation is kept in force across restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PersistenceStrategy {
    /// Scheduled task triggered at system start
    StartupTask { task_name: String },
}

/// Record of a registered persistence task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistenceReceipt {
    pub task_name: String,
    /// Command line the task runs
    pub command: String,
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s)
}

/// Command line that re-issues `remediation` for `identity`
pub fn build_task_command(
    identity: &SettingIdentity,
    remediation: &Remediation,
) -> Result<String, ApplyError> {
    match (identity, remediation) {
        (
            SettingIdentity::AuditSubcategory { subcategory },
            Remediation::SetAuditPolicy { success, failure },
        ) => {
            let args = build_set_args(subcategory, *success, *failure).ok_or_else(|| {
                ApplyError::NoToggles {
                    identity: identity.to_string(),
                }
            })?;
            // Subcategory names contain spaces and must stay one token
            let rendered: Vec<String> = args
                .iter()
                .map(|a| match a.strip_prefix("/subcategory:") {
                    Some(name) => format!("/subcategory:{}", quote(name)),
                    None => a.clone(),
                })
                .collect();
            Ok(format!("{} {}", AUDITPOL, rendered.join(" ")))
        }
        (
            SettingIdentity::Registry {
                hive,
                key_path,
                value_name,
            },
            Remediation::SetRegistryValue { value },
        ) => {
            let data = match value {
                FieldValue::Dword(v) => v.to_string(),
                FieldValue::String(s) => quote(s),
            };
            Ok(format!(
                "reg.exe add {} /v {} /t {} /d {} /f",
                quote(&format!("{}\\{}", hive, key_path)),
                quote(value_name),
                value.registry_type(),
                data
            ))
        }
        _ => Err(ApplyError::incompatible(identity, remediation)),
    }
}

/// Registers remediations to be re-applied at every start
pub trait PersistenceRegistrar {
    fn register(
        &self,
        strategy: &PersistenceStrategy,
        identity: &SettingIdentity,
        remediation: &Remediation,
    ) -> Result<PersistenceReceipt, ApplyError>;
}

/// Registers startup tasks through `schtasks`
#[derive(Debug, Clone)]
pub struct StartupTaskScheduler<R> {
    runner: R,
}

impl<R: CommandRunner> StartupTaskScheduler<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Build `schtasks /create` arguments for a task running `command`
    pub fn build_create_args(task_name: &str, command: &str) -> Vec<String> {
        [
            "/create", "/tn", task_name, "/sc", "onstart", "/ru", "SYSTEM", "/rl", "highest",
            "/f", "/tr", command,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

impl<R: CommandRunner> PersistenceRegistrar for StartupTaskScheduler<R> {
    fn register(
        &self,
        strategy: &PersistenceStrategy,
        identity: &SettingIdentity,
        remediation: &Remediation,
    ) -> Result<PersistenceReceipt, ApplyError> {
        let PersistenceStrategy::StartupTask { task_name } = strategy;
        let command = build_task_command(identity, remediation)?;
        let args = Self::build_create_args(task_name, &command);

        log::info!("Registering startup task '{}': {}", task_name, command);

        let output = self
            .runner
            .run(SCHTASKS, &args)
            .map_err(|e| ApplyError::PersistenceFailed {
                task_name: task_name.clone(),
                reason: e.to_string(),
            })?;

        if !output.success() {
            return Err(ApplyError::PersistenceFailed {
                task_name: task_name.clone(),
                reason: format!(
                    "schtasks exited with {}: {}",
                    output.exit_code,
                    output.stderr.trim()
                ),
            });
        }

        Ok(PersistenceReceipt {
            task_name: task_name.clone(),
            command,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;
    use crate::types::RegistryHive;
    use std::sync::Arc;

    #[test]
    fn test_audit_task_command_quotes_subcategory() {
        let command = build_task_command(
            &SettingIdentity::audit_subcategory("Other Logon/Logoff Events"),
            &Remediation::SetAuditPolicy {
                success: Some(true),
                failure: None,
            },
        )
        .unwrap();
        assert_eq!(
            command,
            r#"auditpol.exe /set /subcategory:"Other Logon/Logoff Events" /success:enable"#
        );
    }

    #[test]
    fn test_registry_task_command() {
        let command = build_task_command(
            &SettingIdentity::registry(
                RegistryHive::LocalMachine,
                r"SOFTWARE\Policies\Microsoft\Windows\Explorer",
                "NoAutoplayfornonVolume",
            ),
            &Remediation::SetRegistryValue {
                value: FieldValue::Dword(1),
            },
        )
        .unwrap();
        assert_eq!(
            command,
            r#"reg.exe add "HKLM\SOFTWARE\Policies\Microsoft\Windows\Explorer" /v "NoAutoplayfornonVolume" /t REG_DWORD /d 1 /f"#
        );
    }

    #[test]
    fn test_mismatched_pair_rejected() {
        let err = build_task_command(
            &SettingIdentity::resultant_policy("Turn off Autoplay"),
            &Remediation::SetRegistryValue {
                value: FieldValue::Dword(1),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApplyError::Incompatible { .. }));
    }

    #[test]
    fn test_register_runs_schtasks() {
        let runner = Arc::new(ScriptedRunner::new());
        let scheduler = StartupTaskScheduler::new(runner.clone());

        let receipt = scheduler
            .register(
                &PersistenceStrategy::StartupTask {
                    task_name: "STIG-AuditPolicy".to_string(),
                },
                &SettingIdentity::audit_subcategory("Other Logon/Logoff Events"),
                &Remediation::SetAuditPolicy {
                    success: Some(true),
                    failure: Some(true),
                },
            )
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "schtasks.exe");
        assert_eq!(
            &calls[0].1[..10],
            &["/create", "/tn", "STIG-AuditPolicy", "/sc", "onstart", "/ru", "SYSTEM", "/rl", "highest", "/f"]
        );
        assert_eq!(calls[0].1[11], receipt.command);
    }

    #[test]
    fn test_register_failure() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.fail_all(true);
        let scheduler = StartupTaskScheduler::new(runner);

        let err = scheduler
            .register(
                &PersistenceStrategy::StartupTask {
                    task_name: "STIG-AuditPolicy".to_string(),
                },
                &SettingIdentity::audit_subcategory("Logoff"),
                &Remediation::SetAuditPolicy {
                    success: Some(true),
                    failure: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ApplyError::PersistenceFailed { .. }));
    }
}
