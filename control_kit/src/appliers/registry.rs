//! Registry value applier

use super::{ApplyError, Remediation, StateApplier, WriteReceipt};
use crate::commands::RegistryBackend;
use crate::types::{ProviderKind, SettingIdentity};

/// Applier that writes registry values through a `RegistryBackend`
#[derive(Debug, Clone)]
pub struct RegistryApplier<B> {
    id: String,
    backend: B,
}

impl<B: RegistryBackend> RegistryApplier<B> {
    pub fn new(id: impl Into<String>, backend: B) -> Self {
        Self {
            id: id.into(),
            backend,
        }
    }
}

impl<B: RegistryBackend> StateApplier for RegistryApplier<B> {
    fn apply(
        &self,
        identity: &SettingIdentity,
        remediation: &Remediation,
    ) -> Result<WriteReceipt, ApplyError> {
        self.validate_identity(identity)?;

        let (
            SettingIdentity::Registry {
                hive,
                key_path,
                value_name,
            },
            Remediation::SetRegistryValue { value },
        ) = (identity, remediation)
        else {
            return Err(ApplyError::incompatible(identity, remediation));
        };

        log::info!("Writing {} {} to {}", value.registry_type(), value, identity);

        self.backend
            .set_value(*hive, key_path, value_name, value)
            .map_err(|e| ApplyError::write_failed(identity, e.to_string()))?;

        Ok(WriteReceipt {
            identity: identity.clone(),
            remediation: remediation.clone(),
            detail: format!("{} = {} {}", identity, value.registry_type(), value),
        })
    }

    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Registry
    }

    fn applier_id(&self) -> &str {
        &self.id
    }
}
