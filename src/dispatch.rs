//! Hand-off to the sandbox launcher.

use std::ffi::{OsStr, OsString};
use std::sync::Arc;

use claw_config::constants::defaults;
use claw_runner::{CommandExecutor, CommandInvocation, CommandStatus, escape_wildcards};
use tracing::debug;

use crate::error::ClawError;
use crate::resolver::SandboxName;

/// `law` followed by `args`, each with its wildcards quoted.
pub fn forwarded_arguments<S: AsRef<OsStr>>(args: &[S]) -> Vec<OsString> {
    std::iter::once(OsString::from(defaults::FORWARDED_COMMAND))
        .chain(
            args.iter()
                .map(|arg| escape_wildcards(arg.as_ref()).into_owned()),
        )
        .collect()
}

/// `<launcher> <sandbox> law <args...>`
pub fn launcher_invocation<S: AsRef<OsStr>>(
    launcher: &str,
    sandbox: &SandboxName,
    args: &[S],
) -> CommandInvocation {
    let mut argv = Vec::with_capacity(args.len() + 2);
    argv.push(sandbox.as_os_str().to_os_string());
    argv.extend(forwarded_arguments(args));
    CommandInvocation::new(launcher, argv)
}

pub struct Dispatcher {
    executor: Arc<dyn CommandExecutor>,
    launcher: String,
}

impl Dispatcher {
    pub fn new(executor: Arc<dyn CommandExecutor>, launcher: impl Into<String>) -> Self {
        Self {
            executor,
            launcher: launcher.into(),
        }
    }

    /// Run the launcher for `sandbox` and wait for it. A launcher that runs
    /// and fails is not an error here: its status is returned as-is.
    pub async fn dispatch<S: AsRef<OsStr>>(
        &self,
        sandbox: &SandboxName,
        args: &[S],
    ) -> Result<CommandStatus, ClawError> {
        let invocation = launcher_invocation(&self.launcher, sandbox, args);
        debug!(command = %invocation.command_line(), "starting sandbox launcher");

        let status = self.executor.run(&invocation).await?;
        debug!(exit_code = status.exit_code(), "sandbox launcher finished");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_runner::{DryRunCommandExecutor, ExecError, ProcessCommandExecutor};
    use pretty_assertions::assert_eq;

    fn sandbox(name: &str) -> SandboxName {
        SandboxName::new(name).expect("non-empty test sandbox")
    }

    #[test]
    fn forwarded_arguments_start_with_law() {
        assert_eq!(forwarded_arguments::<&str>(&[]), vec!["law"]);
        assert_eq!(
            forwarded_arguments(&["run", "TaskX", "--param=1"]),
            vec!["law", "run", "TaskX", "--param=1"]
        );
    }

    #[test]
    fn forwarded_arguments_quote_wildcards() {
        assert_eq!(
            forwarded_arguments(&["--datasets", "tt_*"]),
            vec!["law", "--datasets", "tt_\"*\""]
        );
    }

    #[test]
    fn invocation_places_sandbox_before_law() {
        let invocation = launcher_invocation("cf_sandbox", &sandbox("my_sandbox"), &["index"]);
        assert_eq!(invocation.program, "cf_sandbox");
        assert_eq!(invocation.args, vec!["my_sandbox", "law", "index"]);
        assert_eq!(invocation.timeout, None);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_arguments_are_forwarded_byte_for_byte() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let sandbox = SandboxName::new(OsString::from_vec(b"sb\xff".to_vec()))
            .expect("non-empty sandbox");
        let args = [
            OsString::from_vec(b"file\xff.root".to_vec()),
            OsString::from_vec(b"tt_\xfe*".to_vec()),
        ];

        let invocation = launcher_invocation("cf_sandbox", &sandbox, &args);

        let argv: Vec<&[u8]> = invocation.args.iter().map(|arg| arg.as_bytes()).collect();
        assert_eq!(
            argv,
            vec![
                b"sb\xff".as_slice(),
                b"law".as_slice(),
                b"file\xff.root".as_slice(),
                b"tt_\xfe\"*\"".as_slice(),
            ]
        );
    }

    #[tokio::test]
    async fn dispatch_hands_the_invocation_to_the_executor() {
        let executor = DryRunCommandExecutor::new();
        let dispatcher = Dispatcher::new(Arc::new(executor.clone()), "cf_sandbox");

        let status = dispatcher
            .dispatch(&sandbox("venv_columnar_dev"), &["index"])
            .await
            .expect("dry run never fails");

        assert!(status.success());
        let logged = executor.logged_invocations();
        assert_eq!(logged.len(), 1);
        assert_eq!(
            logged[0].command_line(),
            "cf_sandbox venv_columnar_dev law index"
        );
    }

    #[tokio::test]
    async fn missing_launcher_is_launcher_not_found() {
        let dispatcher = Dispatcher::new(
            Arc::new(ProcessCommandExecutor::new()),
            "claw-test-missing-launcher",
        );

        let err = dispatcher
            .dispatch(&sandbox("venv_columnar_dev"), &["index"])
            .await
            .expect_err("launcher does not exist");

        assert!(matches!(
            err,
            ClawError::LauncherNotFound {
                source: ExecError::NotFound { .. },
                ..
            }
        ));
        assert_eq!(err.exit_code(), 127);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launcher_failure_code_is_passed_through() {
        let script = tempfile::NamedTempFile::new().expect("temp file");
        std::fs::write(script.path(), "exit 42\n").expect("write script");
        let script_path = script.path().display().to_string();

        // `sh <script> <sandbox> law ...` stands in for a failing launcher.
        let dispatcher = Dispatcher::new(Arc::new(ProcessCommandExecutor::new()), "sh");
        let status = dispatcher
            .dispatch(&sandbox(&script_path), &["run"])
            .await
            .expect("sh starts");

        assert_eq!(status.exit_code(), 42);
    }
}
