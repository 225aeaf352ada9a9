//! # Control Execution API
//!
//! Runs one control through the pipeline:
//!
//! ```text
//! read -> normalize -> compare -> [apply -> re-read -> normalize -> compare] -> report
//! ```
//!
//! Callers build a `StrategyRegistry` with the collectors and appliers for
//! the host, then call `check_control()` or `remediate_control()` once per
//! control. Every control is independent; nothing is batched or rolled back.
//!
//! ## Example
//!
//! ```ignore
//! use control_kit::execution_api::{check_control, StrategyRegistry, StrategyKey};
//!
//! let mut registry = StrategyRegistry::new();
//! registry.register_collector(
//!     StrategyKey::registry(),
//!     Box::new(RegistryCollector::new("registry", NativeRegistry::new())),
//! )?;
//!
//! let report = check_control(&registry, &control)?;
//! println!("{}: {}", report.control_id, report.verdict);
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::appliers::{
    PersistenceReceipt, PersistenceRegistrar, Remediation, StateApplier, WriteReceipt,
};
use crate::collectors::StateCollector;
use crate::contracts::Control;
use crate::executors::evaluate_collection;
use crate::normalizers::ReportSchema;
use crate::types::{ComplianceResult, FailureKind, ProviderKind, Verdict};

// ============================================================================
// Error Type
// ============================================================================

/// Error type for control execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("no collector registered for {key} (control {control_id})")]
    NoCollector { control_id: String, key: StrategyKey },

    #[error("no applier registered for {provider} settings (control {control_id})")]
    NoApplier {
        control_id: String,
        provider: ProviderKind,
    },

    #[error("control {0} has no remediation")]
    NoRemediation(String),

    #[error("a strategy is already registered for {0}")]
    DuplicateStrategy(String),

    #[error("strategy registered for {key} reports provider {actual}")]
    ProviderMismatch { key: StrategyKey, actual: ProviderKind },
}

// ============================================================================
// Strategy Registry
// ============================================================================

/// Lookup key for a collector
///
/// Audit subcategory collectors are keyed by report schema as well, since
/// each schema needs a different provider invocation and normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrategyKey {
    pub provider: ProviderKind,
    pub schema: Option<ReportSchema>,
}

impl StrategyKey {
    pub fn registry() -> Self {
        Self {
            provider: ProviderKind::Registry,
            schema: None,
        }
    }

    pub fn audit(schema: ReportSchema) -> Self {
        Self {
            provider: ProviderKind::AuditSubcategory,
            schema: Some(schema),
        }
    }

    pub fn resultant() -> Self {
        Self {
            provider: ProviderKind::ResultantPolicy,
            schema: None,
        }
    }

    /// Key of the collector that reads `control`
    pub fn for_control(control: &Control) -> Self {
        match control.rule.identity.kind() {
            ProviderKind::Registry => Self::registry(),
            ProviderKind::AuditSubcategory => Self::audit(control.schema),
            ProviderKind::ResultantPolicy => Self::resultant(),
        }
    }
}

impl fmt::Display for StrategyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.schema {
            Some(schema) => write!(f, "{} ({:?})", self.provider, schema),
            None => write!(f, "{}", self.provider),
        }
    }
}

/// Collectors, appliers and persistence registrar available on this host
#[derive(Default)]
pub struct StrategyRegistry {
    collectors: HashMap<StrategyKey, Box<dyn StateCollector>>,
    appliers: HashMap<ProviderKind, Box<dyn StateApplier>>,
    registrar: Option<Box<dyn PersistenceRegistrar>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_collector(
        &mut self,
        key: StrategyKey,
        collector: Box<dyn StateCollector>,
    ) -> Result<(), ExecutionError> {
        if collector.provider_kind() != key.provider {
            return Err(ExecutionError::ProviderMismatch {
                key,
                actual: collector.provider_kind(),
            });
        }
        if self.collectors.contains_key(&key) {
            return Err(ExecutionError::DuplicateStrategy(key.to_string()));
        }
        self.collectors.insert(key, collector);
        Ok(())
    }

    pub fn register_applier(&mut self, applier: Box<dyn StateApplier>) -> Result<(), ExecutionError> {
        let kind = applier.provider_kind();
        if self.appliers.contains_key(&kind) {
            return Err(ExecutionError::DuplicateStrategy(format!("{} applier", kind)));
        }
        self.appliers.insert(kind, applier);
        Ok(())
    }

    pub fn set_registrar(&mut self, registrar: Box<dyn PersistenceRegistrar>) {
        self.registrar = Some(registrar);
    }

    fn collector_for(&self, control: &Control) -> Result<&dyn StateCollector, ExecutionError> {
        let key = StrategyKey::for_control(control);
        self.collectors
            .get(&key)
            .map(|c| c.as_ref())
            .ok_or_else(|| ExecutionError::NoCollector {
                control_id: control.id.clone(),
                key,
            })
    }

    fn applier_for(&self, control: &Control) -> Result<&dyn StateApplier, ExecutionError> {
        let provider = control.rule.identity.kind();
        self.appliers
            .get(&provider)
            .map(|a| a.as_ref())
            .ok_or_else(|| ExecutionError::NoApplier {
                control_id: control.id.clone(),
                provider,
            })
    }

    /// Number of registered collectors
    pub fn collector_count(&self) -> usize {
        self.collectors.len()
    }
}

// ============================================================================
// Reports
// ============================================================================

/// What happened to the write step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteOutcome {
    Applied { receipt: WriteReceipt },
    Skipped { reason: String },
    Failed { error: String },
}

/// What happened to the persistence step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PersistenceOutcome {
    Registered { receipt: PersistenceReceipt },
    Failed { error: String },
}

/// Before/after record of one control run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlReport {
    pub control_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub before: ComplianceResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write: Option<WriteOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<ComplianceResult>,
    /// Final verdict for the run
    pub verdict: Verdict,
}

impl ControlReport {
    fn new(control: &Control, before: ComplianceResult) -> Self {
        Self {
            control_id: control.id.clone(),
            title: control.title.clone(),
            notes: control.notes.clone(),
            verdict: before.verdict.clone(),
            before,
            write: None,
            persistence: None,
            after: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict.is_compliant()
    }
}

/// Options for `remediate_control`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemediateOptions {
    /// Write even when the control already passes
    pub force: bool,
    /// Register the control's persistence strategy after the write
    pub persist: bool,
}

// ============================================================================
// Public API Functions
// ============================================================================

fn read(collector: &dyn StateCollector, control: &Control) -> ComplianceResult {
    evaluate_collection(&control.rule, collector.collect(&control.rule.identity))
}

/// Read and judge one control without writing anything
pub fn check_control(
    registry: &StrategyRegistry,
    control: &Control,
) -> Result<ControlReport, ExecutionError> {
    let collector = registry.collector_for(control)?;
    log::info!("Checking {} ({})", control.id, control.rule.identity);

    let before = read(collector, control);
    log::debug!("{} before: {}", control.id, before.verdict);

    Ok(ControlReport::new(control, before))
}

/// Read, write when needed, then re-read and judge one control
///
/// The final verdict is taken from the re-read, never from the write:
/// - re-read indeterminate: that verdict stands, even after a successful write
/// - write accepted but re-read still mismatched: `WriteRejected`
pub fn remediate_control(
    registry: &StrategyRegistry,
    control: &Control,
    options: RemediateOptions,
) -> Result<ControlReport, ExecutionError> {
    let remediation = control
        .remediation
        .as_ref()
        .ok_or_else(|| ExecutionError::NoRemediation(control.id.clone()))?;
    let collector = registry.collector_for(control)?;
    let applier = registry.applier_for(control)?;

    log::info!("Remediating {} ({})", control.id, control.rule.identity);

    let before = read(collector, control);
    let mut report = ControlReport::new(control, before);

    if report.before.passed() && !options.force {
        log::info!("{} already compliant, no write issued", control.id);
        report.write = Some(WriteOutcome::Skipped {
            reason: "already compliant".to_string(),
        });
    } else {
        let write = match applier.apply(&control.rule.identity, remediation) {
            Ok(receipt) => WriteOutcome::Applied { receipt },
            Err(e) => {
                log::error!("{}: {}", control.id, e);
                WriteOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        let after = read(collector, control);
        log::debug!("{} after: {}", control.id, after.verdict);

        report.verdict = final_verdict(&write, &after);
        report.write = Some(write);
        report.after = Some(after);
    }

    let write_failed = matches!(report.write, Some(WriteOutcome::Failed { .. }));
    if options.persist && !write_failed {
        report.persistence = persist(registry, control, remediation);
    }

    Ok(report)
}

fn final_verdict(write: &WriteOutcome, after: &ComplianceResult) -> Verdict {
    match (&after.verdict, write) {
        (Verdict::Compliant, _) => Verdict::Compliant,
        (Verdict::Indeterminate { .. }, _) => after.verdict.clone(),
        (Verdict::Mismatch { expected, actual }, WriteOutcome::Applied { .. }) => {
            Verdict::indeterminate(
                FailureKind::WriteRejected,
                format!(
                    "write accepted but re-read shows {} (expected {})",
                    actual, expected
                ),
            )
        }
        (Verdict::Mismatch { .. }, WriteOutcome::Failed { error }) => {
            Verdict::indeterminate(FailureKind::WriteRejected, error.clone())
        }
        (Verdict::Mismatch { .. }, WriteOutcome::Skipped { .. }) => after.verdict.clone(),
    }
}

fn persist(
    registry: &StrategyRegistry,
    control: &Control,
    remediation: &Remediation,
) -> Option<PersistenceOutcome> {
    let Some(strategy) = &control.persistence else {
        log::warn!("{} declares no persistence strategy", control.id);
        return None;
    };
    let Some(registrar) = &registry.registrar else {
        log::warn!("No persistence registrar available for {}", control.id);
        return Some(PersistenceOutcome::Failed {
            error: "no persistence registrar configured".to_string(),
        });
    };

    let outcome = match registrar.register(strategy, &control.rule.identity, remediation) {
        Ok(receipt) => PersistenceOutcome::Registered { receipt },
        Err(e) => {
            log::error!("{}: {}", control.id, e);
            PersistenceOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    Some(outcome)
}

// ============================================================================
// Helper Functions for Result Handling
// ============================================================================

/// Whether every report passed
pub fn all_compliant(reports: &[ControlReport]) -> bool {
    reports.iter().all(ControlReport::passed)
}

/// Pass rate as a percentage (0.0 - 100.0)
pub fn pass_rate(reports: &[ControlReport]) -> f64 {
    if reports.is_empty() {
        0.0
    } else {
        let passed = reports.iter().filter(|r| r.passed()).count();
        (passed as f64 / reports.len() as f64) * 100.0
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::appliers::{
        AuditPolicyApplier, PersistenceStrategy, RegistryApplier, StartupTaskScheduler,
    };
    use crate::collectors::{AuditPolicyCollector, RegistryCollector, ResultantPolicyCollector};
    use crate::contracts::catalog::builtin_controls;
    use crate::test_support::{MemoryRegistry, ScriptedRunner};
    use crate::types::{AuditFlag, Comparison, FieldValue, RegistryHive};
    use std::sync::Arc;

    struct Host {
        registry: Arc<MemoryRegistry>,
        runner: Arc<ScriptedRunner>,
        strategies: StrategyRegistry,
    }

    fn host() -> Host {
        let registry = Arc::new(MemoryRegistry::new());
        let runner = Arc::new(ScriptedRunner::new());

        let mut strategies = StrategyRegistry::new();
        strategies
            .register_collector(
                StrategyKey::registry(),
                Box::new(RegistryCollector::new("registry", registry.clone())),
            )
            .unwrap();
        for schema in [
            ReportSchema::Tabular,
            ReportSchema::CsvInclusion,
            ReportSchema::CsvPerFlag,
        ] {
            strategies
                .register_collector(
                    StrategyKey::audit(schema),
                    Box::new(AuditPolicyCollector::new("audit", runner.clone(), schema)),
                )
                .unwrap();
        }
        strategies
            .register_collector(
                StrategyKey::resultant(),
                Box::new(ResultantPolicyCollector::new("rsop", runner.clone())),
            )
            .unwrap();
        strategies
            .register_applier(Box::new(RegistryApplier::new("registry", registry.clone())))
            .unwrap();
        strategies
            .register_applier(Box::new(AuditPolicyApplier::new("audit", runner.clone())))
            .unwrap();
        strategies.set_registrar(Box::new(StartupTaskScheduler::new(runner.clone())));

        Host {
            registry,
            runner,
            strategies,
        }
    }

    fn control(id: &str) -> Control {
        builtin_controls()
            .into_iter()
            .find(|c| c.id == id)
            .expect("builtin control")
    }

    const CLOUD_KEY: &str = r"SOFTWARE\Policies\Microsoft\Windows\CloudContent";
    const CLOUD_VALUE: &str = "DisableWindowsConsumerFeatures";

    #[test]
    fn test_check_absent_registry_value() {
        let host = host();
        let report = check_control(&host.strategies, &control("WN11-CC-000197")).unwrap();

        assert!(!report.passed());
        assert_eq!(report.verdict.failure_kind(), Some(FailureKind::NotFound));
        assert!(report.after.is_none());
        assert!(report.write.is_none());
    }

    #[test]
    fn test_set_then_reread_compliant() {
        let host = host();
        host.registry
            .insert(RegistryHive::LocalMachine, CLOUD_KEY, CLOUD_VALUE, 0u32);

        let report = remediate_control(
            &host.strategies,
            &control("WN11-CC-000197"),
            RemediateOptions::default(),
        )
        .unwrap();

        assert!(!report.before.passed());
        assert!(matches!(report.write, Some(WriteOutcome::Applied { .. })));
        assert!(report.after.as_ref().unwrap().passed());
        assert!(report.passed());
        assert_eq!(
            host.registry
                .get(RegistryHive::LocalMachine, CLOUD_KEY, CLOUD_VALUE),
            Some(FieldValue::Dword(1))
        );
    }

    #[test]
    fn test_remediation_is_idempotent() {
        let host = host();
        let ctl = control("WN11-CC-000197");

        let first = remediate_control(&host.strategies, &ctl, RemediateOptions::default()).unwrap();
        let second = remediate_control(&host.strategies, &ctl, RemediateOptions::default()).unwrap();

        assert!(first.passed());
        assert!(second.passed());
        assert!(matches!(second.write, Some(WriteOutcome::Skipped { .. })));
        assert_eq!(host.registry.write_count(), 1);
        assert_eq!(
            first.after.as_ref().unwrap().observed,
            Some(second.before.observed.clone().unwrap())
        );
    }

    #[test]
    fn test_force_writes_when_compliant() {
        let host = host();
        host.registry
            .insert(RegistryHive::LocalMachine, CLOUD_KEY, CLOUD_VALUE, 1u32);

        let report = remediate_control(
            &host.strategies,
            &control("WN11-CC-000197"),
            RemediateOptions {
                force: true,
                persist: false,
            },
        )
        .unwrap();
        assert!(report.passed());
        assert_eq!(host.registry.write_count(), 1);
    }

    #[test]
    fn test_reread_failure_wins_over_write() {
        let host = host();
        host.runner
            .set_audit("Other Logon/Logoff Events", false, false);
        // Commands exit 0 with no output: the write is accepted, every read fails
        host.runner.empty_output(true);

        let report = remediate_control(
            &host.strategies,
            &control("WN11-AU-000560"),
            RemediateOptions::default(),
        )
        .unwrap();

        assert!(matches!(report.write, Some(WriteOutcome::Applied { .. })));
        assert!(!report.passed());
        assert_eq!(
            report.verdict.failure_kind(),
            Some(FailureKind::ProviderUnavailable)
        );
    }

    #[test]
    fn test_ignored_write_is_rejected() {
        let host = host();
        host.registry
            .insert(RegistryHive::LocalMachine, CLOUD_KEY, CLOUD_VALUE, 0u32);
        host.registry.ignore_writes(true);

        let report = remediate_control(
            &host.strategies,
            &control("WN11-CC-000197"),
            RemediateOptions::default(),
        )
        .unwrap();

        assert!(matches!(report.write, Some(WriteOutcome::Applied { .. })));
        assert_eq!(
            report.verdict.failure_kind(),
            Some(FailureKind::WriteRejected)
        );
    }

    #[test]
    fn test_boolean_definition_passes_after_write() {
        let host = host();
        let controls = crate::contracts::parse_definitions(
            r#"
[[control]]
id = "LOCAL-BOOL"
title = "Script block logging on"
comparison = { op = "equals", field = "value", expected = true }

[control.identity]
provider = "registry"
hive = "HKLM"
key_path = 'SOFTWARE\Policies\Microsoft\Windows\PowerShell\ScriptBlockLogging'
value_name = "EnableScriptBlockLogging"

[control.remediation]
action = "set_registry_value"
value = true
"#,
            "inline",
        )
        .unwrap();
        let ctl = &controls[0];

        let first = remediate_control(&host.strategies, ctl, RemediateOptions::default()).unwrap();
        let second = remediate_control(&host.strategies, ctl, RemediateOptions::default()).unwrap();

        assert!(first.passed(), "first run: {}", first.verdict);
        assert!(second.passed(), "second run: {}", second.verdict);
        assert!(matches!(second.write, Some(WriteOutcome::Skipped { .. })));
        assert_eq!(host.registry.write_count(), 1);
        assert_eq!(
            host.registry.get(
                RegistryHive::LocalMachine,
                r"SOFTWARE\Policies\Microsoft\Windows\PowerShell\ScriptBlockLogging",
                "EnableScriptBlockLogging"
            ),
            Some(FieldValue::Dword(1))
        );
    }

    #[test]
    fn test_audit_write_blocked_by_legacy_policy() {
        let host = host();
        host.runner
            .set_audit("Other Logon/Logoff Events", false, false);
        // auditpol reports success but the legacy category policy wins
        host.runner.ignore_sets(true);

        let report = remediate_control(
            &host.strategies,
            &control("WN11-AU-000560"),
            RemediateOptions::default(),
        )
        .unwrap();

        assert!(matches!(report.write, Some(WriteOutcome::Applied { .. })));
        assert!(!report.passed());
        assert_eq!(
            report.verdict.failure_kind(),
            Some(FailureKind::WriteRejected)
        );
        assert_eq!(
            host.runner.audit("Other Logon/Logoff Events"),
            Some((false, false))
        );
    }

    #[test]
    fn test_per_flag_report_partial_and_combined() {
        let host = host();
        host.runner.set_audit("Credential Validation", true, false);
        host.runner.per_flag_reports(true);

        let per_flag = |id: &str| {
            let mut ctl = control(id);
            ctl.schema = ReportSchema::CsvPerFlag;
            ctl
        };
        let mut combined = per_flag("WN11-AU-000005");
        combined.id = "LOCAL-CV-BOTH".to_string();
        combined.rule.comparison = Comparison::FlagsEnabled {
            flags: vec![AuditFlag::Success, AuditFlag::Failure],
        };
        combined.remediation = Some(Remediation::SetAuditPolicy {
            success: Some(true),
            failure: Some(true),
        });
        combined.validate().unwrap();

        let success = check_control(&host.strategies, &per_flag("WN11-AU-000010")).unwrap();
        let failure = check_control(&host.strategies, &per_flag("WN11-AU-000005")).unwrap();
        let both = check_control(&host.strategies, &combined).unwrap();
        assert!(success.passed());
        assert!(!failure.passed());
        assert!(!both.passed());
        assert_eq!(both.verdict.failure_kind(), Some(FailureKind::Mismatch));
        assert_eq!(
            both.before.observed.as_ref().unwrap().field("failure"),
            Some(&FieldValue::String("Disabled".to_string()))
        );

        let fixed = remediate_control(&host.strategies, &combined, RemediateOptions::default())
            .unwrap();
        assert!(fixed.passed());
        assert_eq!(host.runner.audit("Credential Validation"), Some((true, true)));
        assert!(host
            .runner
            .calls()
            .iter()
            .any(|(program, args)| program == "auditpol.exe" && args.iter().any(|a| a == "/r")));
    }

    #[test]
    fn test_failed_write_is_reported() {
        let host = host();
        host.registry.fail_writes(true);

        let report = remediate_control(
            &host.strategies,
            &control("WN11-CC-000038"),
            RemediateOptions {
                force: false,
                persist: true,
            },
        )
        .unwrap();

        assert!(matches!(report.write, Some(WriteOutcome::Failed { .. })));
        assert!(!report.passed());
        assert!(report.persistence.is_none());
    }

    #[test]
    fn test_audit_remediation_with_persistence() {
        let host = host();
        host.runner
            .set_audit("Other Logon/Logoff Events", false, true);

        let report = remediate_control(
            &host.strategies,
            &control("WN11-AU-000560"),
            RemediateOptions {
                force: false,
                persist: true,
            },
        )
        .unwrap();

        assert!(report.passed());
        assert_eq!(
            host.runner.audit("Other Logon/Logoff Events"),
            Some((true, true))
        );
        match &report.persistence {
            Some(PersistenceOutcome::Registered { receipt }) => {
                assert_eq!(receipt.task_name, "STIG-WN11-AU-000560");
            }
            other => panic!("expected registered task, got {:?}", other),
        }
        assert!(host
            .runner
            .calls()
            .iter()
            .any(|(program, _)| program == "schtasks.exe"));
    }

    #[test]
    fn test_credential_validation_flags() {
        let host = host();
        host.runner.set_audit("Credential Validation", true, false);

        let success = check_control(&host.strategies, &control("WN11-AU-000010")).unwrap();
        let failure = check_control(&host.strategies, &control("WN11-AU-000005")).unwrap();
        assert!(success.passed());
        assert!(!failure.passed());

        let fixed = remediate_control(
            &host.strategies,
            &control("WN11-AU-000005"),
            RemediateOptions::default(),
        )
        .unwrap();
        assert!(fixed.passed());
    }

    #[test]
    fn test_resultant_policy_check() {
        let host = host();
        host.runner.set_gpresult(
            "    GPO: Local Group Policy\r\n        Policy:    Turn off Autoplay\r\n        Computer Setting:  Enabled\r\n",
        );

        let report = check_control(&host.strategies, &control("WN11-CC-000190")).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn test_missing_remediation() {
        let host = host();
        let err = remediate_control(
            &host.strategies,
            &control("WN11-CC-000190"),
            RemediateOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, ExecutionError::NoRemediation("WN11-CC-000190".to_string()));
    }

    #[test]
    fn test_missing_collector() {
        let strategies = StrategyRegistry::new();
        let err = check_control(&strategies, &control("WN11-CC-000197")).unwrap_err();
        assert!(matches!(err, ExecutionError::NoCollector { .. }));
    }

    #[test]
    fn test_register_rejects_wrong_provider() {
        let mut strategies = StrategyRegistry::new();
        let err = strategies
            .register_collector(
                StrategyKey::resultant(),
                Box::new(RegistryCollector::new("registry", Arc::new(MemoryRegistry::new()))),
            )
            .unwrap_err();
        assert!(matches!(err, ExecutionError::ProviderMismatch { .. }));
    }

    #[test]
    fn test_persist_without_strategy() {
        let host = host();
        let mut ctl = control("WN11-CC-000197");
        ctl.persistence = None;
        ctl.remediation = Some(Remediation::SetRegistryValue {
            value: FieldValue::Dword(1),
        });

        let report = remediate_control(
            &host.strategies,
            &ctl,
            RemediateOptions {
                force: false,
                persist: true,
            },
        )
        .unwrap();
        assert!(report.persistence.is_none());

        ctl.persistence = Some(PersistenceStrategy::StartupTask {
            task_name: "STIG-Consumer".to_string(),
        });
        let report = remediate_control(
            &host.strategies,
            &ctl,
            RemediateOptions {
                force: false,
                persist: true,
            },
        )
        .unwrap();
        assert!(matches!(
            report.persistence,
            Some(PersistenceOutcome::Registered { .. })
        ));
    }

    #[test]
    fn test_pass_rate() {
        assert_eq!(pass_rate(&[]), 0.0);
        let host = host();
        let report = check_control(&host.strategies, &control("WN11-CC-000197")).unwrap();
        assert_eq!(pass_rate(std::slice::from_ref(&report)), 0.0);
        assert!(!all_compliant(&[report]));
    }
}
