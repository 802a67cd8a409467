use claw_runner::ExecError;
use thiserror::Error;

/// Exit code for a launcher that could not be found or started.
pub const LAUNCHER_NOT_FOUND_EXIT_CODE: u8 = 127;
/// Exit code for unusable configuration.
pub const USAGE_EXIT_CODE: u8 = 2;
pub const INTERNAL_EXIT_CODE: u8 = 1;

#[derive(Debug, Error)]
pub enum ClawError {
    #[error("sandbox launcher `{program}` could not be started")]
    LauncherNotFound {
        program: String,
        #[source]
        source: ExecError,
    },

    /// The launcher started but could not be waited on.
    #[error(transparent)]
    Launcher(ExecError),

    #[error(transparent)]
    Config(anyhow::Error),
}

impl ClawError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::LauncherNotFound { .. } => LAUNCHER_NOT_FOUND_EXIT_CODE,
            Self::Config(_) => USAGE_EXIT_CODE,
            Self::Launcher(_) => INTERNAL_EXIT_CODE,
        }
    }
}

impl From<ExecError> for ClawError {
    fn from(err: ExecError) -> Self {
        if err.is_launch_failure() {
            Self::LauncherNotFound {
                program: err.program().to_string(),
                source: err,
            }
        } else {
            Self::Launcher(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[test]
    fn spawn_failures_become_launcher_not_found() {
        let err = ClawError::from(ExecError::spawn(
            "cf_sandbox",
            io::Error::from(io::ErrorKind::PermissionDenied),
        ));
        assert!(matches!(err, ClawError::LauncherNotFound { .. }));
        assert_eq!(err.exit_code(), 127);
        assert_eq!(
            err.to_string(),
            "sandbox launcher `cf_sandbox` could not be started"
        );
    }

    #[test]
    fn other_exec_errors_stay_launcher_errors() {
        let err = ClawError::from(ExecError::TimedOut {
            program: "cf_sandbox".to_string(),
            timeout: Duration::from_secs(1),
        });
        assert!(matches!(err, ClawError::Launcher(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn config_errors_are_usage_errors() {
        let err = ClawError::Config(anyhow::anyhow!("bad claw.toml"));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "bad claw.toml");
    }
}
