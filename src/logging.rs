use claw_config::ClawConfig;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber for the shim's own diagnostics.
///
/// `CLAW_LOG` (or `RUST_LOG`) takes precedence over the `[debug]` section of
/// `claw.toml`. Stdout is left to the launcher.
pub fn init_tracing(config: &ClawConfig) {
    let mut rejected = None;
    let filter = match config.runtime.log_filter.as_deref() {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            rejected = Some((directive, err));
            EnvFilter::new(config.debug.default_filter())
        }),
        None => EnvFilter::new(config.debug.default_filter()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();

    if let Some((directive, err)) = rejected {
        tracing::warn!(%directive, error = %err, "ignoring invalid log filter");
    }
}
