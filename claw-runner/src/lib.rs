//! Child-process plumbing used by the `claw` shim. The crate exposes a
//! trait-based executor so the binary can swap the underlying strategy
//! (real processes or dry-run logging) while the sandbox resolver and the
//! launcher dispatch stay unaware of how commands actually run.

pub mod error;
pub mod escape;
pub mod executor;

pub use error::ExecError;
pub use escape::{escape_wildcards, render_command_line};
pub use executor::{
    CommandExecutor, CommandInvocation, CommandOutput, CommandStatus, DryRunCommandExecutor,
    ProcessCommandExecutor,
};
