//! In-memory providers for unit tests
//!
//! `MemoryRegistry` stands in for the Windows registry and `ScriptedRunner`
//! emulates `auditpol`, `gpresult` and `schtasks` closely enough for the
//! collectors and appliers to run their real parsing and argument code.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use crate::commands::hardening::AUDITPOL_UNKNOWN_SUBCATEGORY;
use crate::commands::{CommandError, CommandOutput, CommandRunner, RegistryBackend, RegistryError};
use crate::types::{FieldValue, RegistryHive};

type RegistryKey = (RegistryHive, String, String);

#[derive(Default)]
struct RegistryState {
    values: HashMap<RegistryKey, FieldValue>,
    fail_reads: bool,
    fail_writes: bool,
    ignore_writes: bool,
    writes: usize,
}

/// Registry held in a map
#[derive(Default)]
pub struct MemoryRegistry {
    state: Mutex<RegistryState>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
        value: impl Into<FieldValue>,
    ) {
        self.state.lock().unwrap().values.insert(
            (hive, key_path.to_string(), value_name.to_string()),
            value.into(),
        );
    }

    pub fn get(&self, hive: RegistryHive, key_path: &str, value_name: &str) -> Option<FieldValue> {
        self.state
            .lock()
            .unwrap()
            .values
            .get(&(hive, key_path.to_string(), value_name.to_string()))
            .cloned()
    }

    /// Make every read fail
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    /// Make every write fail with access denied
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    /// Accept writes without storing them, like a policy override
    pub fn ignore_writes(&self, ignore: bool) {
        self.state.lock().unwrap().ignore_writes = ignore;
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

impl RegistryBackend for MemoryRegistry {
    fn get_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
    ) -> Result<Option<FieldValue>, RegistryError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(RegistryError::Os {
                path: format!("{}\\{}", hive, key_path),
                code: 1450,
            });
        }
        Ok(state
            .values
            .get(&(hive, key_path.to_string(), value_name.to_string()))
            .cloned())
    }

    fn set_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
        value: &FieldValue,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(RegistryError::AccessDenied(format!("{}\\{}", hive, key_path)));
        }
        state.writes += 1;
        if !state.ignore_writes {
            state.values.insert(
                (hive, key_path.to_string(), value_name.to_string()),
                value.clone(),
            );
        }
        Ok(())
    }
}

#[derive(Default)]
struct RunnerState {
    audit: HashMap<String, (bool, bool)>,
    gpresult: String,
    calls: Vec<(String, Vec<String>)>,
    fail_all: bool,
    empty_output: bool,
    ignore_sets: bool,
    per_flag_reports: bool,
}

/// Command runner emulating the provider tools
#[derive(Default)]
pub struct ScriptedRunner {
    state: Mutex<RunnerState>,
}

fn ok(stdout: String) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout,
        stderr: String::new(),
    }
}

fn phrase(success: bool, failure: bool) -> &'static str {
    match (success, failure) {
        (true, true) => "Success and Failure",
        (true, false) => "Success",
        (false, true) => "Failure",
        (false, false) => "No Auditing",
    }
}

fn flag_text(enabled: bool) -> &'static str {
    if enabled {
        "Enabled"
    } else {
        "Disabled"
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_audit(&self, subcategory: &str, success: bool, failure: bool) {
        self.state
            .lock()
            .unwrap()
            .audit
            .insert(subcategory.to_string(), (success, failure));
    }

    pub fn audit(&self, subcategory: &str) -> Option<(bool, bool)> {
        self.state.lock().unwrap().audit.get(subcategory).copied()
    }

    pub fn set_gpresult(&self, dump: &str) {
        self.state.lock().unwrap().gpresult = dump.to_string();
    }

    /// Make every command fail to start
    pub fn fail_all(&self, fail: bool) {
        self.state.lock().unwrap().fail_all = fail;
    }

    /// Return successful but empty output
    pub fn empty_output(&self, empty: bool) {
        self.state.lock().unwrap().empty_output = empty;
    }

    /// Report `/set` success without changing state, like a legacy policy override
    pub fn ignore_sets(&self, ignore: bool) {
        self.state.lock().unwrap().ignore_sets = ignore;
    }

    /// Emit per-flag columns for `/r` reports
    pub fn per_flag_reports(&self, per_flag: bool) {
        self.state.lock().unwrap().per_flag_reports = per_flag;
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().calls.clone()
    }

    fn auditpol(state: &mut RunnerState, args: &[String]) -> CommandOutput {
        let subcategory = args
            .iter()
            .find_map(|a| a.strip_prefix("/subcategory:"))
            .unwrap_or_default()
            .to_string();

        let Some(&(success, failure)) = state.audit.get(&subcategory) else {
            return CommandOutput {
                exit_code: AUDITPOL_UNKNOWN_SUBCATEGORY,
                stdout: String::new(),
                stderr: "Error 0x00000057 occurred:\r\nThe parameter is incorrect.".to_string(),
            };
        };

        if args.first().map(String::as_str) == Some("/set") {
            let toggle = |name: &str, current: bool| {
                match args
                    .iter()
                    .find_map(|a| a.strip_prefix(&format!("/{}:", name)))
                {
                    Some("enable") => true,
                    Some("disable") => false,
                    _ => current,
                }
            };
            let updated = (toggle("success", success), toggle("failure", failure));
            if !state.ignore_sets {
                state.audit.insert(subcategory, updated);
            }
            return ok("The command was successfully executed.\r\n".to_string());
        }

        if args.iter().any(|a| a == "/r") {
            let tail = if state.per_flag_reports {
                format!("{},{}", flag_text(success), flag_text(failure))
            } else {
                format!("{},", phrase(success, failure))
            };
            return ok(format!(
                "Machine Name,Policy Target,Subcategory,Subcategory GUID,Inclusion Setting,Exclusion Setting\r\n\
                 TESTHOST,System,{},{{0cce9241-69ae-11d9-bed3-505054503030}},{}\r\n",
                subcategory, tail
            ));
        }

        ok(format!(
            "System audit policy\r\nCategory/Subcategory                      Setting\r\nLogon/Logoff\r\n  {}               {}\r\n",
            subcategory,
            phrase(success, failure)
        ))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((program.to_string(), args.to_vec()));

        if state.fail_all {
            return Err(CommandError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted failure"),
            });
        }
        if state.empty_output {
            return Ok(ok(String::new()));
        }

        let output = match program {
            "auditpol.exe" => Self::auditpol(&mut state, args),
            "gpresult.exe" => ok(state.gpresult.clone()),
            "schtasks.exe" => ok("SUCCESS: The scheduled task has been created.\r\n".to_string()),
            other => CommandOutput {
                exit_code: 9009,
                stdout: String::new(),
                stderr: format!("'{}' is not recognized", other),
            },
        };
        Ok(output)
    }
}
