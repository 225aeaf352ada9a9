//! Audit policy subcategory collector
//!
//! Executes `auditpol /get /subcategory:<name>` (optionally with `/r`) and
//! normalizes the output with the schema the collector was built for.

use super::{CollectionError, StateCollector};
use crate::commands::hardening::{AUDITPOL, AUDITPOL_UNKNOWN_SUBCATEGORY};
use crate::commands::CommandRunner;
use crate::normalizers::{normalize_audit_output, ReportSchema};
use crate::types::{ObservedState, ProviderKind, SettingIdentity};

/// Collector that queries advanced audit policy through `auditpol`
#[derive(Debug, Clone)]
pub struct AuditPolicyCollector<R> {
    id: String,
    runner: R,
    schema: ReportSchema,
}

impl<R: CommandRunner> AuditPolicyCollector<R> {
    /// Create a collector that reads reports in `schema` form
    pub fn new(id: impl Into<String>, runner: R, schema: ReportSchema) -> Self {
        Self {
            id: id.into(),
            runner,
            schema,
        }
    }

    pub fn schema(&self) -> ReportSchema {
        self.schema
    }

    /// Build `auditpol /get` arguments for one subcategory
    pub fn build_get_args(&self, subcategory: &str) -> Vec<String> {
        let mut args = vec!["/get".to_string(), format!("/subcategory:{}", subcategory)];
        if self.schema.is_report() {
            args.push("/r".to_string());
        }
        args
    }
}

impl<R: CommandRunner> StateCollector for AuditPolicyCollector<R> {
    fn collect(&self, identity: &SettingIdentity) -> Result<ObservedState, CollectionError> {
        self.validate_identity(identity)?;

        let SettingIdentity::AuditSubcategory { subcategory } = identity else {
            return Err(CollectionError::UnsupportedIdentity {
                collector_id: self.id.clone(),
                kind: identity.kind(),
            });
        };

        let args = self.build_get_args(subcategory);
        let output = self
            .runner
            .run(AUDITPOL, &args)
            .map_err(|e| CollectionError::unavailable(identity, format!("auditpol failed: {}", e)))?;

        if output.exit_code == AUDITPOL_UNKNOWN_SUBCATEGORY {
            return Err(CollectionError::NotFound {
                identity: identity.to_string(),
            });
        }

        if !output.success() {
            let detail = if output.stderr.trim().is_empty() {
                output.stdout.trim()
            } else {
                output.stderr.trim()
            };
            return Err(CollectionError::unavailable(
                identity,
                format!("auditpol exited with {}: {}", output.exit_code, detail),
            ));
        }

        if output.stdout.trim().is_empty() {
            return Err(CollectionError::unavailable(
                identity,
                "auditpol returned no output",
            ));
        }

        let record = normalize_audit_output(self.schema, &output.stdout, subcategory)
            .map_err(|e| CollectionError::from_normalize(identity, e))?;

        log::debug!("Read {} with {:?} schema: {:?}", identity, self.schema, record);

        Ok(ObservedState::present(identity.clone(), output.stdout).with_fields(record))
    }

    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::AuditSubcategory
    }

    fn collector_id(&self) -> &str {
        &self.id
    }
}
