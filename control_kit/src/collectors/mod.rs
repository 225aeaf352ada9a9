//! # State Collectors Module
//!
//! A collector reads one setting from its provider and returns a fresh
//! `ObservedState`:
//! - RegistryCollector: registry values through a `RegistryBackend`
//! - AuditPolicyCollector: `auditpol /get` in the declared report schema
//! - ResultantPolicyCollector: `gpresult /z` policy state lookup
//!
//! A collector never returns a default in place of state it could not
//! determine. Provider errors, empty output, unparseable output and absent
//! subcategories are all `CollectionError`s. An absent registry value is
//! the one exception: it is returned as an observation with
//! `exists == false` so the missing value can be displayed.

pub mod audit_policy;
pub mod registry;
pub mod resultant_policy;

pub use audit_policy::AuditPolicyCollector;
pub use registry::RegistryCollector;
pub use resultant_policy::ResultantPolicyCollector;

use thiserror::Error;

use crate::normalizers::NormalizeError;
use crate::types::{FailureKind, ObservedState, ProviderKind, SettingIdentity};

/// Errors raised while reading a setting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("{provider} provider unavailable for {identity}: {reason}")]
    ProviderUnavailable {
        provider: ProviderKind,
        identity: String,
        reason: String,
    },

    #[error("could not parse {provider} output for {identity}: {reason}")]
    ParseFailure {
        provider: ProviderKind,
        identity: String,
        reason: String,
    },

    #[error("{identity} not found")]
    NotFound { identity: String },

    #[error("collector '{collector_id}' does not handle {kind} settings")]
    UnsupportedIdentity {
        collector_id: String,
        kind: ProviderKind,
    },
}

impl CollectionError {
    pub fn unavailable(identity: &SettingIdentity, reason: impl Into<String>) -> Self {
        CollectionError::ProviderUnavailable {
            provider: identity.kind(),
            identity: identity.to_string(),
            reason: reason.into(),
        }
    }

    /// Map a normalizer error onto the collection taxonomy
    pub fn from_normalize(identity: &SettingIdentity, err: NormalizeError) -> Self {
        match err {
            NormalizeError::NoMatch(_) => CollectionError::NotFound {
                identity: identity.to_string(),
            },
            other => CollectionError::ParseFailure {
                provider: identity.kind(),
                identity: identity.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CollectionError::ProviderUnavailable { .. }
            | CollectionError::UnsupportedIdentity { .. } => FailureKind::ProviderUnavailable,
            CollectionError::ParseFailure { .. } => FailureKind::ParseFailure,
            CollectionError::NotFound { .. } => FailureKind::NotFound,
        }
    }
}

/// Reads the current state of settings owned by one provider
pub trait StateCollector {
    /// Read `identity` and return a new snapshot
    fn collect(&self, identity: &SettingIdentity) -> Result<ObservedState, CollectionError>;

    /// Provider this collector reads from
    fn provider_kind(&self) -> ProviderKind;

    fn collector_id(&self) -> &str;

    /// Reject identities owned by another provider
    fn validate_identity(&self, identity: &SettingIdentity) -> Result<(), CollectionError> {
        if identity.kind() != self.provider_kind() {
            return Err(CollectionError::UnsupportedIdentity {
                collector_id: self.collector_id().to_string(),
                kind: identity.kind(),
            });
        }
        Ok(())
    }
}
