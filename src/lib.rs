//! # claw - run `law` inside the right sandbox
//!
//! `claw` is a thin shim in front of a sandbox launcher. Each invocation
//! picks a sandbox name and then runs
//!
//! ```text
//! <launcher> <sandbox> law <arguments...>
//! ```
//!
//! with the caller's arguments forwarded unchanged apart from quoting every
//! `*`. The tool's exit code is the launcher's exit code.
//!
//! The sandbox is the first non-empty answer from:
//!
//! 1. `CLAW_SANDBOX`;
//! 2. `law config analysis.default_columnar_sandbox`, reduced to its file
//!    stem with a `_dev` suffix (`/path/to/foo.cfg` becomes `foo_dev`);
//! 3. `venv_columnar_dev`.
//!
//! Launcher and query programs, the query key, the fallback name, and an
//! optional query timeout can be changed in `claw.toml` or through `CLAW_*`
//! environment variables; see [`claw_config`].

use std::ffi::OsString;
use std::sync::Arc;

use claw_config::{ClawConfig, EnvSnapshot};
use claw_runner::{CommandExecutor, DryRunCommandExecutor, ProcessCommandExecutor};

pub mod dispatch;
pub mod error;
pub mod logging;
pub mod resolver;

pub use dispatch::{Dispatcher, forwarded_arguments, launcher_invocation};
pub use error::ClawError;
pub use resolver::{Resolution, SandboxName, SandboxOrigin, SandboxResolver, normalize_configured};

/// Load configuration from `env`, resolve the sandbox and run the launcher.
/// Returns the exit code the process should finish with.
pub async fn run(args: Vec<OsString>, env: &EnvSnapshot) -> Result<i32, ClawError> {
    let config = ClawConfig::load(env).map_err(ClawError::Config)?;
    logging::init_tracing(&config);
    run_with_config(&config, &args).await
}

pub async fn run_with_config(config: &ClawConfig, args: &[OsString]) -> Result<i32, ClawError> {
    let processes: Arc<dyn CommandExecutor> = Arc::new(ProcessCommandExecutor::new());
    let resolution = SandboxResolver::from_config(config, Arc::clone(&processes))
        .resolve()
        .await;

    if config.runtime.dry_run {
        let dry_run = DryRunCommandExecutor::new();
        let status = Dispatcher::new(Arc::new(dry_run.clone()), config.sandbox.launcher.clone())
            .dispatch(&resolution.name, args)
            .await?;
        for invocation in dry_run.logged_invocations() {
            println!("{}", invocation.command_line());
        }
        return Ok(status.exit_code());
    }

    let status = Dispatcher::new(processes, config.sandbox.launcher.clone())
        .dispatch(&resolution.name, args)
        .await?;
    Ok(status.exit_code())
}
