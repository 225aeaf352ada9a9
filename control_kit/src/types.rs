//! # Control Types
//!
//! Value types shared by collectors, normalizers, executors and appliers.
//!
//! - `SettingIdentity` names one host setting (registry value, audit
//!   subcategory, or resultant group policy).
//! - `ObservedState` is one immutable snapshot of that setting.
//! - `DesiredStateRule` declares what the setting must look like.
//! - `ComplianceResult` is the outcome of comparing the two.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Setting Identity
// ============================================================================

/// Which external provider owns a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Registry,
    AuditSubcategory,
    ResultantPolicy,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Registry => write!(f, "registry"),
            ProviderKind::AuditSubcategory => write!(f, "audit_subcategory"),
            ProviderKind::ResultantPolicy => write!(f, "resultant_policy"),
        }
    }
}

/// Registry hive root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryHive {
    #[serde(rename = "HKLM", alias = "HKEY_LOCAL_MACHINE")]
    LocalMachine,
    #[serde(rename = "HKCU", alias = "HKEY_CURRENT_USER")]
    CurrentUser,
}

impl RegistryHive {
    /// Short hive name as used by `reg.exe`
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryHive::LocalMachine => "HKLM",
            RegistryHive::CurrentUser => "HKCU",
        }
    }
}

impl fmt::Display for RegistryHive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a single host setting
///
/// Registry key paths and value names are reproduced exactly as declared;
/// no case folding or separator normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum SettingIdentity {
    /// Named value under an absolute registry key
    Registry {
        hive: RegistryHive,
        key_path: String,
        value_name: String,
    },
    /// Advanced audit policy subcategory
    AuditSubcategory { subcategory: String },
    /// Named policy in the resultant set of policy dump
    ResultantPolicy { policy_name: String },
}

impl SettingIdentity {
    pub fn registry(
        hive: RegistryHive,
        key_path: impl Into<String>,
        value_name: impl Into<String>,
    ) -> Self {
        SettingIdentity::Registry {
            hive,
            key_path: key_path.into(),
            value_name: value_name.into(),
        }
    }

    pub fn audit_subcategory(subcategory: impl Into<String>) -> Self {
        SettingIdentity::AuditSubcategory {
            subcategory: subcategory.into(),
        }
    }

    pub fn resultant_policy(policy_name: impl Into<String>) -> Self {
        SettingIdentity::ResultantPolicy {
            policy_name: policy_name.into(),
        }
    }

    /// Provider that owns this setting
    pub fn kind(&self) -> ProviderKind {
        match self {
            SettingIdentity::Registry { .. } => ProviderKind::Registry,
            SettingIdentity::AuditSubcategory { .. } => ProviderKind::AuditSubcategory,
            SettingIdentity::ResultantPolicy { .. } => ProviderKind::ResultantPolicy,
        }
    }
}

impl fmt::Display for SettingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingIdentity::Registry {
                hive,
                key_path,
                value_name,
            } => write!(f, "{}\\{} [{}]", hive, key_path, value_name),
            SettingIdentity::AuditSubcategory { subcategory } => {
                write!(f, "audit subcategory '{}'", subcategory)
            }
            SettingIdentity::ResultantPolicy { policy_name } => {
                write!(f, "resultant policy '{}'", policy_name)
            }
        }
    }
}

// ============================================================================
// Field Values
// ============================================================================

/// Typed value of one normalized field
///
/// Comparison is typed: a `Dword(1)` never equals `String("1")`.
/// Boolean literals in definitions load as `Dword` 0/1, the form the
/// registry stores and reads back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Dword(u32),
    String(String),
}

/// Literal accepted in control definitions
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldLiteral {
    Bool(bool),
    Dword(u32),
    String(String),
}

impl From<FieldLiteral> for FieldValue {
    fn from(literal: FieldLiteral) -> Self {
        match literal {
            FieldLiteral::Bool(b) => FieldValue::from(b),
            FieldLiteral::Dword(v) => FieldValue::Dword(v),
            FieldLiteral::String(s) => FieldValue::String(s),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FieldLiteral::deserialize(deserializer).map(FieldValue::from)
    }
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Registry value type name this value is written as
    pub fn registry_type(&self) -> &'static str {
        match self {
            FieldValue::Dword(_) => "REG_DWORD",
            FieldValue::String(_) => "REG_SZ",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Dword(v) => write!(f, "{} (0x{:08x})", v, v),
            FieldValue::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Dword(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Dword(u32::from(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

/// Audit outcome class toggled by `auditpol`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditFlag {
    Success,
    Failure,
}

impl AuditFlag {
    /// Keyword as it appears in provider phrases ("Success and Failure")
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditFlag::Success => "Success",
            AuditFlag::Failure => "Failure",
        }
    }

    /// Normalized record field carrying this flag's state
    pub fn field_name(&self) -> &'static str {
        match self {
            AuditFlag::Success => "success",
            AuditFlag::Failure => "failure",
        }
    }
}

impl fmt::Display for AuditFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal flag column text meaning "audited"
pub const FLAG_ENABLED: &str = "Enabled";
/// Literal flag column text meaning "not audited"
pub const FLAG_DISABLED: &str = "Disabled";

// ============================================================================
// Observed State
// ============================================================================

fn sha256_digest(raw: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(raw.as_bytes())))
}

#[allow(clippy::ptr_arg)]
fn serialize_digest<S: Serializer>(raw: &String, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&sha256_digest(raw))
}

/// One snapshot of a setting as read from its provider
///
/// Built once per read. There is no in-place mutation; every read
/// produces a new value. Serialized output carries a digest of the raw
/// provider text, not the text itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedState {
    identity: SettingIdentity,
    exists: bool,
    #[serde(rename = "raw_sha256", serialize_with = "serialize_digest")]
    raw: String,
    fields: BTreeMap<String, FieldValue>,
}

impl ObservedState {
    /// Snapshot of a setting the provider reported
    pub fn present(identity: SettingIdentity, raw: impl Into<String>) -> Self {
        Self {
            identity,
            exists: true,
            raw: raw.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Snapshot of a setting whose key or value does not exist
    pub fn absent(identity: SettingIdentity, raw: impl Into<String>) -> Self {
        Self {
            identity,
            exists: false,
            raw: raw.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (String, FieldValue)>,
    {
        self.fields.extend(fields);
        self
    }

    pub fn identity(&self) -> &SettingIdentity {
        &self.identity
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// SHA-256 of the raw provider output, hex encoded
    pub fn raw_digest(&self) -> String {
        sha256_digest(&self.raw)
    }
}

// ============================================================================
// Desired State
// ============================================================================

/// How a normalized field is judged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Comparison {
    /// Field exists and equals the literal exactly
    Equals { field: String, expected: FieldValue },
    /// Field text contains the keyword anywhere (accepts supersets)
    Contains { field: String, keyword: String },
    /// Every listed flag column reads "Enabled"
    FlagsEnabled { flags: Vec<AuditFlag> },
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equals { field, expected } => write!(f, "{} == {}", field, expected),
            Comparison::Contains { field, keyword } => {
                write!(f, "{} contains \"{}\"", field, keyword)
            }
            Comparison::FlagsEnabled { flags } => {
                let names: Vec<&str> = flags.iter().map(|f| f.as_str()).collect();
                write!(f, "{} enabled", names.join(" and "))
            }
        }
    }
}

/// Declared target state for one setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredStateRule {
    pub identity: SettingIdentity,
    pub comparison: Comparison,
}

impl DesiredStateRule {
    pub fn new(identity: SettingIdentity, comparison: Comparison) -> Self {
        Self {
            identity,
            comparison,
        }
    }
}

// ============================================================================
// Compliance Result
// ============================================================================

/// Failure taxonomy surfaced to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Provider command or API errored or returned nothing
    ProviderUnavailable,
    /// Output received but not in the expected shape
    ParseFailure,
    /// Key, value, subcategory or policy absent
    NotFound,
    /// Value present and parsed but does not satisfy the rule
    Mismatch,
    /// Write attempted but the re-read shows it did not take effect
    WriteRejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::ProviderUnavailable => "provider unavailable",
            FailureKind::ParseFailure => "parse failure",
            FailureKind::NotFound => "not found",
            FailureKind::Mismatch => "mismatch",
            FailureKind::WriteRejected => "write rejected",
        };
        f.write_str(s)
    }
}

/// Outcome of evaluating one rule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Compliant,
    Mismatch { expected: String, actual: String },
    Indeterminate { kind: FailureKind, detail: String },
}

impl Verdict {
    pub fn indeterminate(kind: FailureKind, detail: impl Into<String>) -> Self {
        Verdict::Indeterminate {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_compliant(&self) -> bool {
        matches!(self, Verdict::Compliant)
    }

    /// Failure class, `None` when compliant
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Verdict::Compliant => None,
            Verdict::Mismatch { .. } => Some(FailureKind::Mismatch),
            Verdict::Indeterminate { kind, .. } => Some(*kind),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Compliant => write!(f, "compliant"),
            Verdict::Mismatch { expected, actual } => {
                write!(f, "mismatch: expected {}, found {}", expected, actual)
            }
            Verdict::Indeterminate { kind, detail } => write!(f, "{}: {}", kind, detail),
        }
    }
}

/// A rule, what was observed, and whether it passed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResult {
    pub rule: DesiredStateRule,
    pub observed: Option<ObservedState>,
    pub verdict: Verdict,
}

impl ComplianceResult {
    pub fn new(rule: DesiredStateRule, observed: Option<ObservedState>, verdict: Verdict) -> Self {
        Self {
            rule,
            observed,
            verdict,
        }
    }

    /// Result for a read that produced no observation at all
    pub fn unobserved(rule: DesiredStateRule, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::new(rule, None, Verdict::indeterminate(kind, detail))
    }

    pub fn passed(&self) -> bool {
        self.verdict.is_compliant()
    }
}
