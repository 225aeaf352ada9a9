//! Registry value collector
//!
//! Reads a single named value and exposes it as the `value` field.

use super::{CollectionError, StateCollector};
use crate::commands::{RegistryBackend, RegistryError};
use crate::types::{ObservedState, ProviderKind, SettingIdentity};

/// Field holding the registry value
pub const VALUE_FIELD: &str = "value";

/// Collector for registry values
#[derive(Debug, Clone)]
pub struct RegistryCollector<B> {
    id: String,
    backend: B,
}

impl<B: RegistryBackend> RegistryCollector<B> {
    pub fn new(id: impl Into<String>, backend: B) -> Self {
        Self {
            id: id.into(),
            backend,
        }
    }
}

impl<B: RegistryBackend> StateCollector for RegistryCollector<B> {
    fn collect(&self, identity: &SettingIdentity) -> Result<ObservedState, CollectionError> {
        self.validate_identity(identity)?;

        let SettingIdentity::Registry {
            hive,
            key_path,
            value_name,
        } = identity
        else {
            return Err(CollectionError::UnsupportedIdentity {
                collector_id: self.id.clone(),
                kind: identity.kind(),
            });
        };

        match self.backend.get_value(*hive, key_path, value_name) {
            Ok(Some(value)) => {
                let raw = format!("{}    {}    {}", value_name, value.registry_type(), value);
                log::debug!("Read {} = {}", identity, value);
                Ok(ObservedState::present(identity.clone(), raw).with_field(VALUE_FIELD, value))
            }
            Ok(None) => {
                log::debug!("{} does not exist", identity);
                Ok(ObservedState::absent(
                    identity.clone(),
                    format!("{} not present", identity),
                ))
            }
            Err(RegistryError::UnsupportedType { value_type, .. }) => {
                Err(CollectionError::ParseFailure {
                    provider: ProviderKind::Registry,
                    identity: identity.to_string(),
                    reason: format!("value has unsupported registry type {}", value_type),
                })
            }
            Err(e) => Err(CollectionError::unavailable(identity, e.to_string())),
        }
    }

    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Registry
    }

    fn collector_id(&self) -> &str {
        &self.id
    }
}
