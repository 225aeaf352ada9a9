//! Resultant policy collector
//!
//! Dumps the computer-scope resultant set of policy with `gpresult` and
//! looks up one policy's effective state.

use super::{CollectionError, StateCollector};
use crate::commands::hardening::GPRESULT;
use crate::commands::CommandRunner;
use crate::normalizers::parse_policy_state;
use crate::types::{ObservedState, ProviderKind, SettingIdentity};

/// Collector that probes `gpresult /scope computer /z`
#[derive(Debug, Clone)]
pub struct ResultantPolicyCollector<R> {
    id: String,
    runner: R,
}

impl<R: CommandRunner> ResultantPolicyCollector<R> {
    pub fn new(id: impl Into<String>, runner: R) -> Self {
        Self {
            id: id.into(),
            runner,
        }
    }

    pub fn build_args() -> Vec<String> {
        vec![
            "/scope".to_string(),
            "computer".to_string(),
            "/z".to_string(),
        ]
    }
}

impl<R: CommandRunner> StateCollector for ResultantPolicyCollector<R> {
    fn collect(&self, identity: &SettingIdentity) -> Result<ObservedState, CollectionError> {
        self.validate_identity(identity)?;

        let SettingIdentity::ResultantPolicy { policy_name } = identity else {
            return Err(CollectionError::UnsupportedIdentity {
                collector_id: self.id.clone(),
                kind: identity.kind(),
            });
        };

        let output = self
            .runner
            .run(GPRESULT, &Self::build_args())
            .map_err(|e| CollectionError::unavailable(identity, format!("gpresult failed: {}", e)))?;

        if !output.success() {
            return Err(CollectionError::unavailable(
                identity,
                format!(
                    "gpresult exited with {}: {}",
                    output.exit_code,
                    output.stderr.trim()
                ),
            ));
        }

        if output.stdout.trim().is_empty() {
            return Err(CollectionError::unavailable(
                identity,
                "gpresult returned no output",
            ));
        }

        let record = parse_policy_state(&output.stdout, policy_name)
            .map_err(|e| CollectionError::from_normalize(identity, e))?;

        Ok(ObservedState::present(identity.clone(), output.stdout).with_fields(record))
    }

    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::ResultantPolicy
    }

    fn collector_id(&self) -> &str {
        &self.id
    }
}
