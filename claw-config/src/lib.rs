//! Configuration for the `claw` sandbox shim.
//!
//! Settings come from three layers, highest precedence first: process
//! environment variables, an optional `claw.toml`, and the built-in defaults
//! in [`constants::defaults`]. The environment is captured exactly once into
//! an [`EnvSnapshot`] so every consumer sees the same values.

pub mod constants;
pub mod debug;
pub mod env;
pub mod loader;

pub use debug::{DebugConfig, TraceLevel};
pub use env::EnvSnapshot;
pub use loader::{ClawConfig, RuntimeOptions, SandboxConfig};
