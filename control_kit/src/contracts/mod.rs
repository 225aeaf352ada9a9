//! # Control Contracts Module
//!
//! A control ties a STIG identifier to a desired-state rule, the report
//! schema its audit reader must use, and an optional remediation with an
//! optional persistence strategy.
//!
//! - `catalog`: controls compiled into the crate
//! - `definitions`: controls loaded from TOML files at runtime

pub mod catalog;
pub mod definitions;

pub use catalog::builtin_controls;
pub use definitions::{load_definitions, parse_definitions, ControlCatalog};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::appliers::{PersistenceStrategy, Remediation};
use crate::normalizers::ReportSchema;
use crate::types::{Comparison, DesiredStateRule, ProviderKind};

/// One STIG control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub rule: DesiredStateRule,
    /// Report layout for audit subcategory reads
    #[serde(default)]
    pub schema: ReportSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceStrategy>,
    /// Operator-facing caveat shown with every result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Control {
    pub fn new(id: impl Into<String>, title: impl Into<String>, rule: DesiredStateRule) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            rule,
            schema: ReportSchema::default(),
            remediation: None,
            persistence: None,
            notes: None,
        }
    }

    pub fn with_schema(mut self, schema: ReportSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_remediation(mut self, remediation: Remediation) -> Self {
        self.remediation = Some(remediation);
        self
    }

    pub fn with_persistence(mut self, persistence: PersistenceStrategy) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check the control is internally consistent
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let invalid = |reason: &str| DefinitionError::Invalid {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("control id is empty"));
        }

        let kind = self.rule.identity.kind();

        if let Comparison::FlagsEnabled { flags } = &self.rule.comparison {
            if flags.is_empty() {
                return Err(invalid("flags_enabled lists no flags"));
            }
            if kind != ProviderKind::AuditSubcategory {
                return Err(invalid("flags_enabled applies only to audit subcategories"));
            }
            if !self.schema.is_report() {
                return Err(invalid("flags_enabled needs a csv report schema"));
            }
        }

        if let Some(remediation) = &self.remediation {
            if remediation.provider_kind() != kind {
                return Err(invalid("remediation targets a different provider"));
            }
            if let Remediation::SetAuditPolicy {
                success: None,
                failure: None,
            } = remediation
            {
                return Err(invalid("audit remediation toggles no flags"));
            }
        }

        if self.persistence.is_some() && self.remediation.is_none() {
            return Err(invalid("persistence requires a remediation"));
        }

        Ok(())
    }
}

/// Errors raised while loading or selecting controls
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("cannot read control definitions {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("control {id}: {reason}")]
    Invalid { id: String, reason: String },

    #[error("control {0} is defined more than once")]
    Duplicate(String),

    #[error("unknown control {0}")]
    UnknownControl(String),
}
