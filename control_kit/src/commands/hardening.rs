//! Windows hardening command executor configuration
//!
//! Provides a whitelisted command executor for audit policy, resultant
//! policy and scheduled task commands.

use super::executor::SystemCommandExecutor;
use std::time::Duration;

/// Audit policy tool
pub const AUDITPOL: &str = "auditpol.exe";
/// Resultant set of policy tool
pub const GPRESULT: &str = "gpresult.exe";
/// Task scheduler tool
pub const SCHTASKS: &str = "schtasks.exe";

/// `auditpol` exit code for a subcategory name it does not know
/// (ERROR_INVALID_PARAMETER)
pub const AUDITPOL_UNKNOWN_SUBCATEGORY: i32 = 87;

/// Default per-command timeout
///
/// `gpresult /z` on a domain-joined host routinely takes several seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create command executor configured for Windows hardening checks
///
/// Whitelist includes:
/// - auditpol.exe: read and write advanced audit policy
/// - gpresult.exe: resultant policy dump
/// - schtasks.exe: startup re-application task registration
pub fn create_windows_command_executor(timeout: Duration) -> SystemCommandExecutor {
    let mut executor = SystemCommandExecutor::with_timeout(timeout);

    executor.allow_commands(&[
        AUDITPOL,
        r"C:\Windows\System32\auditpol.exe",
        GPRESULT,
        r"C:\Windows\System32\gpresult.exe",
        SCHTASKS,
        r"C:\Windows\System32\schtasks.exe",
    ]);

    executor
}
