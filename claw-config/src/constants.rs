/// Environment variable names read by the shim.
pub mod env {
    /// Explicit sandbox name; bypasses the configuration query.
    pub const SANDBOX: &str = "CLAW_SANDBOX";
    pub const CONFIG_PATH: &str = "CLAW_CONFIG_PATH";
    pub const LAUNCHER: &str = "CLAW_LAUNCHER";
    pub const QUERY_TOOL: &str = "CLAW_QUERY_TOOL";
    /// Seconds to wait for the configuration query; `0` disables the limit.
    pub const QUERY_TIMEOUT: &str = "CLAW_QUERY_TIMEOUT";
    pub const DRY_RUN: &str = "CLAW_DRY_RUN";
    /// `tracing` filter directive for the shim's own diagnostics.
    pub const LOG: &str = "CLAW_LOG";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Built-in defaults used when neither the environment nor `claw.toml`
/// provides a value.
pub mod defaults {
    pub const LAUNCHER: &str = "cf_sandbox";
    pub const QUERY_TOOL: &str = "law";
    /// Subcommand passed to the query tool before the key.
    pub const QUERY_SUBCOMMAND: &str = "config";
    pub const QUERY_KEY: &str = "analysis.default_columnar_sandbox";
    pub const FALLBACK_SANDBOX: &str = "venv_columnar_dev";
    /// Suffix every configured sandbox name carries.
    pub const DEV_SUFFIX: &str = "_dev";
    /// Token placed before the forwarded arguments on the launcher command line.
    pub const FORWARDED_COMMAND: &str = "law";
    pub const QUERY_TIMEOUT_SECONDS: u64 = 0;
    pub const CONFIG_DIR_NAME: &str = "claw";
    pub const CONFIG_FILE_NAME: &str = "claw.toml";
}
