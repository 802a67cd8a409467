use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::{Child, Command};

use crate::error::ExecError;
use crate::escape::render_command_line;

/// Exit code reported when a child ends without a code or signal, which only
/// happens on platforms without POSIX signals.
const UNKNOWN_EXIT_CODE: i32 = 1;

/// Offset added to a terminating signal number, as POSIX shells do.
const SIGNAL_EXIT_BASE: i32 = 128;

/// Describes a command that will be executed by a [`CommandExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub timeout: Option<Duration>,
}

impl CommandInvocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: None,
        }
    }

    /// Bound how long the executor waits for the child. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command_line(&self) -> String {
        render_command_line(&self.program, &self.args)
    }
}

/// Describes the exit status of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    success: bool,
    code: Option<i32>,
    signal: Option<i32>,
}

impl CommandStatus {
    pub fn new(success: bool, code: Option<i32>) -> Self {
        Self {
            success,
            code,
            signal: None,
        }
    }

    pub fn from_code(code: i32) -> Self {
        Self::new(code == 0, Some(code))
    }

    pub fn from_signal(signal: i32) -> Self {
        Self {
            success: false,
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn signal(&self) -> Option<i32> {
        self.signal
    }

    /// The code a shell would report for this status: the child's own exit
    /// code, or `128 + N` when it was killed by signal `N`.
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => SIGNAL_EXIT_BASE + signal,
            (None, None) => UNKNOWN_EXIT_CODE,
        }
    }
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            success: status.success(),
            code: status.code(),
            signal,
        }
    }
}

/// Output captured from a command whose stdout was piped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::from_code(0),
            stdout: stdout.into(),
        }
    }
}

/// Trait implemented by concrete command execution strategies.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the command with stdout captured, stderr discarded and stdin
    /// closed.
    async fn capture(&self, invocation: &CommandInvocation) -> Result<CommandOutput, ExecError>;

    /// Run the command with the caller's stdio attached and wait for it.
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandStatus, ExecError>;
}

/// Executes commands as real child processes via [`tokio::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self
    }

    fn spawn(invocation: &CommandInvocation, command: &mut Command) -> Result<Child, ExecError> {
        command
            .args(&invocation.args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::spawn(&invocation.program, source))
    }
}

/// Await `future`, giving up after `timeout` when one is set. Dropping the
/// future drops the child, which `kill_on_drop` then terminates.
async fn wait_bounded<F, T>(
    invocation: &CommandInvocation,
    future: F,
) -> Result<T, ExecError>
where
    F: Future<Output = std::io::Result<T>>,
{
    let waited = match invocation.timeout {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_elapsed| ExecError::TimedOut {
                program: invocation.program.clone(),
                timeout: limit,
            })?,
        None => future.await,
    };

    waited.map_err(|source| ExecError::Wait {
        program: invocation.program.clone(),
        source,
    })
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn capture(&self, invocation: &CommandInvocation) -> Result<CommandOutput, ExecError> {
        let mut command = Command::new(&invocation.program);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        let child = Self::spawn(invocation, &mut command)?;

        let output = wait_bounded(invocation, child.wait_with_output()).await?;

        Ok(CommandOutput {
            status: CommandStatus::from(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandStatus, ExecError> {
        let mut command = Command::new(&invocation.program);
        let mut child = Self::spawn(invocation, &mut command)?;

        let status = wait_bounded(invocation, child.wait()).await?;
        Ok(CommandStatus::from(status))
    }
}

/// Logs invocations instead of running them. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct DryRunCommandExecutor {
    log: Arc<Mutex<Vec<CommandInvocation>>>,
}

impl DryRunCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged_invocations(&self) -> Vec<CommandInvocation> {
        self.log.lock().clone()
    }

    fn record(&self, invocation: &CommandInvocation) {
        tracing::debug!(command = %invocation.command_line(), "dry-run: skipping execution");
        self.log.lock().push(invocation.clone());
    }
}

#[async_trait]
impl CommandExecutor for DryRunCommandExecutor {
    async fn capture(&self, invocation: &CommandInvocation) -> Result<CommandOutput, ExecError> {
        self.record(invocation);
        Ok(CommandOutput::success(String::new()))
    }

    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandStatus, ExecError> {
        self.record(invocation);
        Ok(CommandStatus::from_code(0))
    }
}
