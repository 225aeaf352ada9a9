//! # STIG Control Kit
//!
//! Building blocks for checking and remediating Windows STIG controls.
//! Each control is read from its provider, normalized, compared against a
//! desired-state rule and optionally written and re-read.
//!
//! ## Modules
//!
//! - `types` - Setting identities, observations, rules and verdicts
//! - `commands` - Whitelisted command execution and native registry access
//! - `normalizers` - Provider text to field maps, one schema per report mode
//! - `collectors` - State readers for registry, audit policy and resultant policy
//! - `executors` - Equality, containment and flag-state comparators
//! - `appliers` - Registry and audit policy writers, startup persistence
//! - `contracts` - Built-in STIG catalog and TOML control definitions
//! - `execution_api` - High-level check/remediate pipeline
//!
//! ## Usage
//!
//! ```rust,ignore
//! use control_kit::contracts::ControlCatalog;
//! use control_kit::execution_api::{check_control, StrategyRegistry};
//!
//! let registry = build_host_registry()?;
//! let catalog = ControlCatalog::builtin();
//!
//! for control in catalog.controls() {
//!     let report = check_control(&registry, control)?;
//!     println!("{}: {}", report.control_id, report.verdict);
//! }
//! ```

pub mod appliers;
pub mod collectors;
pub mod commands;
pub mod contracts;
pub mod execution_api;
pub mod executors;
pub mod normalizers;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;
