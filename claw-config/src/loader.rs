use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{defaults, env as keys};
use crate::debug::DebugConfig;
use crate::env::EnvSnapshot;

/// `[sandbox]` section of `claw.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SandboxConfig {
    /// Program that enters a sandbox and runs a command inside it
    #[serde(default = "SandboxConfig::default_launcher")]
    pub launcher: String,
    /// Program queried for the configured default sandbox
    #[serde(default = "SandboxConfig::default_query_tool")]
    pub query_tool: String,
    /// Configuration key passed to the query tool
    #[serde(default = "SandboxConfig::default_query_key")]
    pub query_key: String,
    /// Sandbox used when neither an override nor a configured value exists
    #[serde(default = "SandboxConfig::default_fallback")]
    pub fallback: String,
    /// Upper bound for the query in seconds; 0 waits indefinitely
    #[serde(default)]
    pub query_timeout_seconds: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            launcher: Self::default_launcher(),
            query_tool: Self::default_query_tool(),
            query_key: Self::default_query_key(),
            fallback: Self::default_fallback(),
            query_timeout_seconds: defaults::QUERY_TIMEOUT_SECONDS,
        }
    }
}

impl SandboxConfig {
    fn default_launcher() -> String {
        defaults::LAUNCHER.to_string()
    }

    fn default_query_tool() -> String {
        defaults::QUERY_TOOL.to_string()
    }

    fn default_query_key() -> String {
        defaults::QUERY_KEY.to_string()
    }

    fn default_fallback() -> String {
        defaults::FALLBACK_SANDBOX.to_string()
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_seconds > 0).then(|| Duration::from_secs(self.query_timeout_seconds))
    }

    /// Replace blank string values with the built-in defaults.
    fn fill_blanks(&mut self) {
        fill_blank(&mut self.launcher, defaults::LAUNCHER);
        fill_blank(&mut self.query_tool, defaults::QUERY_TOOL);
        fill_blank(&mut self.query_key, defaults::QUERY_KEY);
        fill_blank(&mut self.fallback, defaults::FALLBACK_SANDBOX);
    }
}

fn fill_blank(value: &mut String, default: &str) {
    if value.trim().is_empty() {
        default.clone_into(value);
    }
}

/// Settings that only ever come from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Value of `CLAW_SANDBOX`, when set and non-empty
    pub sandbox_override: Option<OsString>,
    pub dry_run: bool,
    /// Explicit `tracing` filter from `CLAW_LOG` or `RUST_LOG`
    pub log_filter: Option<String>,
}

impl RuntimeOptions {
    pub fn from_env(env: &EnvSnapshot) -> Self {
        Self {
            sandbox_override: env.non_empty_os(keys::SANDBOX).map(OsStr::to_os_string),
            dry_run: env.flag(keys::DRY_RUN, false),
            log_filter: env
                .non_empty(keys::LOG)
                .or_else(|| env.non_empty(keys::RUST_LOG))
                .map(str::to_owned),
        }
    }
}

/// Effective configuration for one invocation of the shim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClawConfig {
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(skip)]
    pub runtime: RuntimeOptions,
}

impl ClawConfig {
    /// Load configuration for the given environment snapshot.
    ///
    /// `CLAW_CONFIG_PATH` names a file that must exist. Without it, the
    /// per-user `claw/claw.toml` is read when present. Environment variables
    /// are applied on top of whatever file was loaded.
    pub fn load(env: &EnvSnapshot) -> Result<Self> {
        let mut config = if let Some(path) = env.non_empty(keys::CONFIG_PATH) {
            let trimmed = path.trim();
            Self::load_from_file(trimmed).with_context(|| {
                format!("Failed to load configuration from {}={trimmed}", keys::CONFIG_PATH)
            })?
        } else {
            match Self::user_config_path() {
                Some(path) if path.is_file() => Self::load_from_file(&path)?,
                _ => Self::default(),
            }
        };

        config.apply_env(env)?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.sandbox.fill_blanks();
        Ok(config)
    }

    /// `<config dir>/claw/claw.toml`, when the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(defaults::CONFIG_DIR_NAME)
                .join(defaults::CONFIG_FILE_NAME)
        })
    }

    /// Overlay environment variables onto the loaded values.
    pub fn apply_env(&mut self, env: &EnvSnapshot) -> Result<()> {
        if let Some(launcher) = env.non_empty(keys::LAUNCHER) {
            launcher.clone_into(&mut self.sandbox.launcher);
        }
        if let Some(tool) = env.non_empty(keys::QUERY_TOOL) {
            tool.clone_into(&mut self.sandbox.query_tool);
        }
        if let Some(raw) = env.non_empty(keys::QUERY_TIMEOUT) {
            self.sandbox.query_timeout_seconds = raw.trim().parse().with_context(|| {
                format!(
                    "{} must be a whole number of seconds, got {raw:?}",
                    keys::QUERY_TIMEOUT
                )
            })?;
        }
        self.runtime = RuntimeOptions::from_env(env);
        Ok(())
    }
}
