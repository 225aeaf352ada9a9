//! Audit policy applier
//!
//! Issues `auditpol /set /subcategory:<name> /success:enable|disable
//! /failure:enable|disable`. Only the toggles present in the remediation
//! are passed.

use super::{toggle_word, ApplyError, Remediation, StateApplier, WriteReceipt};
use crate::commands::hardening::AUDITPOL;
use crate::commands::CommandRunner;
use crate::types::{ProviderKind, SettingIdentity};

/// Build `auditpol /set` arguments
///
/// Returns `None` when neither flag is toggled.
pub fn build_set_args(
    subcategory: &str,
    success: Option<bool>,
    failure: Option<bool>,
) -> Option<Vec<String>> {
    if success.is_none() && failure.is_none() {
        return None;
    }

    let mut args = vec!["/set".to_string(), format!("/subcategory:{}", subcategory)];
    if let Some(enabled) = success {
        args.push(format!("/success:{}", toggle_word(enabled)));
    }
    if let Some(enabled) = failure {
        args.push(format!("/failure:{}", toggle_word(enabled)));
    }
    Some(args)
}

/// Applier that sets advanced audit policy through `auditpol`
#[derive(Debug, Clone)]
pub struct AuditPolicyApplier<R> {
    id: String,
    runner: R,
}

impl<R: CommandRunner> AuditPolicyApplier<R> {
    pub fn new(id: impl Into<String>, runner: R) -> Self {
        Self {
            id: id.into(),
            runner,
        }
    }
}

impl<R: CommandRunner> StateApplier for AuditPolicyApplier<R> {
    fn apply(
        &self,
        identity: &SettingIdentity,
        remediation: &Remediation,
    ) -> Result<WriteReceipt, ApplyError> {
        self.validate_identity(identity)?;

        let (
            SettingIdentity::AuditSubcategory { subcategory },
            Remediation::SetAuditPolicy { success, failure },
        ) = (identity, remediation)
        else {
            return Err(ApplyError::incompatible(identity, remediation));
        };

        let args = build_set_args(subcategory, *success, *failure).ok_or_else(|| {
            ApplyError::NoToggles {
                identity: identity.to_string(),
            }
        })?;

        log::info!("Running {} {}", AUDITPOL, args.join(" "));

        let output = self
            .runner
            .run(AUDITPOL, &args)
            .map_err(|e| ApplyError::write_failed(identity, e.to_string()))?;

        if !output.success() {
            let detail = if output.stderr.trim().is_empty() {
                output.stdout.trim()
            } else {
                output.stderr.trim()
            };
            return Err(ApplyError::write_failed(
                identity,
                format!("auditpol exited with {}: {}", output.exit_code, detail),
            ));
        }

        Ok(WriteReceipt {
            identity: identity.clone(),
            remediation: remediation.clone(),
            detail: format!("{} {}", AUDITPOL, args.join(" ")),
        })
    }

    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::AuditSubcategory
    }

    fn applier_id(&self) -> &str {
        &self.id
    }
}
