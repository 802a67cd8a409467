use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failure modes of a single child-process execution.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be located on `PATH`.
    #[error("command `{program}` not found")]
    NotFound {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program exists but the OS refused to start it.
    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The child started but waiting on it failed.
    #[error("failed to wait for `{program}`")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

impl ExecError {
    /// Classify an error returned by `spawn`.
    pub fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        let program = program.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { program, source }
        } else {
            Self::Spawn { program, source }
        }
    }

    /// True when the program never started running.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Spawn { .. })
    }

    pub fn program(&self) -> &str {
        match self {
            Self::NotFound { program, .. }
            | Self::Spawn { program, .. }
            | Self::Wait { program, .. }
            | Self::TimedOut { program, .. } => program,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_classifies_missing_programs() {
        let err = ExecError::spawn("cf_sandbox", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ExecError::NotFound { .. }));
        assert!(err.is_launch_failure());
        assert_eq!(err.to_string(), "command `cf_sandbox` not found");
    }

    #[test]
    fn spawn_keeps_other_io_errors_distinct() {
        let err = ExecError::spawn(
            "cf_sandbox",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, ExecError::Spawn { .. }));
        assert!(err.is_launch_failure());
        assert_eq!(err.program(), "cf_sandbox");
    }

    #[test]
    fn timeouts_are_not_launch_failures() {
        let err = ExecError::TimedOut {
            program: "law".to_string(),
            timeout: Duration::from_secs(3),
        };
        assert!(!err.is_launch_failure());
    }
}
