//! Strategy Registry Setup
//!
//! Creates and configures the strategy registry with the collectors and
//! appliers available on this host.

use std::sync::Arc;
use std::time::Duration;

use control_kit::appliers::{AuditPolicyApplier, RegistryApplier, StartupTaskScheduler};
use control_kit::collectors::{AuditPolicyCollector, RegistryCollector, ResultantPolicyCollector};
use control_kit::commands::{create_windows_command_executor, CommandRunner, NativeRegistry};
use control_kit::execution_api::{ExecutionError, StrategyKey, StrategyRegistry};
use control_kit::normalizers::ReportSchema;

/// Create a registry with all available strategies
///
/// Includes:
/// - Registry values (native Win32 API)
/// - Audit subcategories, one collector per report schema (`auditpol`)
/// - Resultant policy (`gpresult`)
/// - Startup task persistence (`schtasks`)
pub fn create_host_registry(timeout: Duration) -> Result<StrategyRegistry, ExecutionError> {
    let runner: Arc<dyn CommandRunner> = Arc::new(create_windows_command_executor(timeout));
    let native = Arc::new(NativeRegistry::new());

    let mut registry = StrategyRegistry::new();

    registry.register_collector(
        StrategyKey::registry(),
        Box::new(RegistryCollector::new("registry-collector", native.clone())),
    )?;

    for schema in [
        ReportSchema::Tabular,
        ReportSchema::CsvInclusion,
        ReportSchema::CsvPerFlag,
    ] {
        registry.register_collector(
            StrategyKey::audit(schema),
            Box::new(AuditPolicyCollector::new(
                "auditpol-collector",
                runner.clone(),
                schema,
            )),
        )?;
    }

    registry.register_collector(
        StrategyKey::resultant(),
        Box::new(ResultantPolicyCollector::new(
            "gpresult-collector",
            runner.clone(),
        )),
    )?;

    registry.register_applier(Box::new(RegistryApplier::new("registry-applier", native)))?;
    registry.register_applier(Box::new(AuditPolicyApplier::new(
        "auditpol-applier",
        runner.clone(),
    )))?;
    registry.set_registrar(Box::new(StartupTaskScheduler::new(runner)));

    log::debug!(
        "Strategy registry initialized with {} collectors",
        registry.collector_count()
    );

    Ok(registry)
}
