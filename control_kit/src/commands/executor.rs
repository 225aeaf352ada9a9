//! Whitelisted system command executor
//!
//! Every provider command (auditpol, gpresult, schtasks) goes through a
//! `CommandRunner`. The production implementation only spawns programs on
//! its allow list and kills them once the timeout elapses.

use std::collections::HashSet;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Poll interval while waiting on a child process
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of one command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Errors raised before a command produced an exit code
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command '{0}' is not on the allow list")]
    NotAllowed(String),

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("failed waiting on '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can run a provider command
///
/// Collectors and appliers depend on this trait so tests can substitute a
/// scripted runner for the real host.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<T> {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        (**self).run(program, args)
    }
}

/// Command executor restricted to an allow list of programs
#[derive(Debug, Clone)]
pub struct SystemCommandExecutor {
    allowed: HashSet<String>,
    timeout: Duration,
}

impl SystemCommandExecutor {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            allowed: HashSet::new(),
            timeout,
        }
    }

    /// Add programs to the allow list (matched case-insensitively)
    pub fn allow_commands(&mut self, commands: &[&str]) {
        for command in commands {
            self.allowed.insert(command.to_ascii_lowercase());
        }
    }

    pub fn is_allowed(&self, program: &str) -> bool {
        self.allowed.contains(&program.to_ascii_lowercase())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CommandRunner for SystemCommandExecutor {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(program) {
            return Err(CommandError::NotAllowed(program.to_string()));
        }

        log::debug!("Running {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Drain pipes on helper threads; gpresult /z output can exceed the pipe buffer.
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    log::warn!("{} timed out after {:?}", program, self.timeout);
                    return Err(CommandError::Timeout {
                        program: program.to_string(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    return Err(CommandError::Wait {
                        program: program.to_string(),
                        source,
                    })
                }
            }
        };

        let stdout = stdout_reader.map(join_reader).unwrap_or_default();
        let stderr = stderr_reader.map(join_reader).unwrap_or_default();

        Ok(CommandOutput {
            // Terminated by signal on unix; treat as failure
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
