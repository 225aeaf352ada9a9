//! # State Appliers Module
//!
//! An applier performs exactly one write for one setting and returns a
//! receipt. It never reports whether the write took effect; callers
//! re-read through a collector for that.
//!
//! - RegistryApplier: create-key-then-set through a `RegistryBackend`
//! - AuditPolicyApplier: `auditpol /set` with explicit enable/disable toggles
//! - StartupTaskScheduler: optional re-application at boot via `schtasks`

pub mod audit_policy;
pub mod persistence;
pub mod registry;

pub use audit_policy::AuditPolicyApplier;
pub use persistence::{
    PersistenceReceipt, PersistenceRegistrar, PersistenceStrategy, StartupTaskScheduler,
};
pub use registry::RegistryApplier;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::{FieldValue, ProviderKind, SettingIdentity};

/// Desired write for one setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Remediation {
    /// Write a registry value, creating the key path if needed
    SetRegistryValue { value: FieldValue },
    /// Toggle audit flags; `None` leaves a flag untouched
    SetAuditPolicy {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default)]
        failure: Option<bool>,
    },
}

impl Remediation {
    /// Provider the remediation writes to
    pub fn provider_kind(&self) -> ProviderKind {
        match self {
            Remediation::SetRegistryValue { .. } => ProviderKind::Registry,
            Remediation::SetAuditPolicy { .. } => ProviderKind::AuditSubcategory,
        }
    }
}

fn toggle_word(enabled: bool) -> &'static str {
    if enabled {
        "enable"
    } else {
        "disable"
    }
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remediation::SetRegistryValue { value } => {
                write!(f, "set {} {}", value.registry_type(), value)
            }
            Remediation::SetAuditPolicy { success, failure } => {
                let mut parts = Vec::new();
                if let Some(s) = success {
                    parts.push(format!("success:{}", toggle_word(*s)));
                }
                if let Some(fl) = failure {
                    parts.push(format!("failure:{}", toggle_word(*fl)));
                }
                write!(f, "set audit {}", parts.join(" "))
            }
        }
    }
}

/// Record of one write that the provider accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReceipt {
    pub identity: SettingIdentity,
    pub remediation: Remediation,
    /// What was issued: a command line or a registry value description
    pub detail: String,
}

/// Errors raised while writing a setting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("cannot {remediation} on {identity}")]
    Incompatible {
        identity: String,
        remediation: String,
    },

    #[error("remediation for {identity} toggles no audit flags")]
    NoToggles { identity: String },

    #[error("applier '{applier_id}' does not handle {kind} settings")]
    UnsupportedIdentity {
        applier_id: String,
        kind: ProviderKind,
    },

    #[error("write to {identity} failed: {reason}")]
    WriteFailed { identity: String, reason: String },

    #[error("could not register startup task '{task_name}': {reason}")]
    PersistenceFailed { task_name: String, reason: String },
}

impl ApplyError {
    pub(crate) fn incompatible(identity: &SettingIdentity, remediation: &Remediation) -> Self {
        ApplyError::Incompatible {
            identity: identity.to_string(),
            remediation: remediation.to_string(),
        }
    }

    pub(crate) fn write_failed(identity: &SettingIdentity, reason: impl Into<String>) -> Self {
        ApplyError::WriteFailed {
            identity: identity.to_string(),
            reason: reason.into(),
        }
    }
}

/// Writes settings owned by one provider
pub trait StateApplier {
    /// Issue exactly one write of `remediation` to `identity`
    fn apply(
        &self,
        identity: &SettingIdentity,
        remediation: &Remediation,
    ) -> Result<WriteReceipt, ApplyError>;

    fn provider_kind(&self) -> ProviderKind;

    fn applier_id(&self) -> &str;

    /// Reject identities owned by another provider
    fn validate_identity(&self, identity: &SettingIdentity) -> Result<(), ApplyError> {
        if identity.kind() != self.provider_kind() {
            return Err(ApplyError::UnsupportedIdentity {
                applier_id: self.applier_id().to_string(),
                kind: identity.kind(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remediation_display() {
        let audit = Remediation::SetAuditPolicy {
            success: Some(true),
            failure: None,
        };
        assert_eq!(audit.to_string(), "set audit success:enable");

        let reg = Remediation::SetRegistryValue {
            value: FieldValue::Dword(1),
        };
        assert_eq!(reg.to_string(), "set REG_DWORD 1 (0x00000001)");
        assert_eq!(reg.provider_kind(), ProviderKind::Registry);
    }

    #[test]
    fn test_remediation_from_toml() {
        let toml_src = r#"
            action = "set_audit_policy"
            success = true
            failure = true
        "#;
        let remediation: Remediation = toml::from_str(toml_src).expect("parse");
        assert_eq!(
            remediation,
            Remediation::SetAuditPolicy {
                success: Some(true),
                failure: Some(true),
            }
        );
    }
}
