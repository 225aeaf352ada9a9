//! # Commands Module
//!
//! Provider access: whitelisted command execution for `auditpol`,
//! `gpresult` and `schtasks`, plus native registry operations.

pub mod executor;
pub mod hardening;
pub mod registry;

pub use executor::{CommandError, CommandOutput, CommandRunner, SystemCommandExecutor};
pub use hardening::create_windows_command_executor;
pub use registry::{NativeRegistry, RegistryBackend, RegistryError};
