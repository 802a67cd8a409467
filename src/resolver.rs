//! Sandbox name resolution.
//!
//! A sandbox is chosen by walking an ordered list of [`SandboxSource`]s and
//! taking the first one that yields a non-empty name:
//!
//! 1. the `CLAW_SANDBOX` override, verbatim;
//! 2. the value reported by `<query-tool> config <key>`, reduced to its file
//!    stem and suffixed with `_dev`;
//! 3. the configured fallback (`venv_columnar_dev` unless changed).
//!
//! Resolution never fails. If every source comes up empty the built-in
//! default is used.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use claw_config::ClawConfig;
use claw_config::constants::defaults;
use claw_runner::{CommandExecutor, CommandInvocation, ExecError};
use tracing::{debug, warn};

/// Name of an execution environment. Never empty, not necessarily UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SandboxName(OsString);

impl SandboxName {
    pub fn new(value: impl Into<OsString>) -> Option<Self> {
        let value = value.into();
        (!value.is_empty()).then_some(Self(value))
    }

    pub fn builtin_default() -> Self {
        Self(OsString::from(defaults::FALLBACK_SANDBOX))
    }

    pub fn as_os_str(&self) -> &OsStr {
        &self.0
    }
}

impl fmt::Display for SandboxName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_string_lossy())
    }
}

impl AsRef<OsStr> for SandboxName {
    fn as_ref(&self) -> &OsStr {
        &self.0
    }
}

/// Which tier produced a sandbox name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxOrigin {
    Override,
    Configured,
    Default,
}

impl SandboxOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Configured => "configured",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for SandboxOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: SandboxName,
    pub origin: SandboxOrigin,
}

/// One tier of the resolution chain.
#[async_trait]
pub trait SandboxSource: Send + Sync {
    fn origin(&self) -> SandboxOrigin;

    /// A candidate name, or `None` to defer to the next source.
    async fn lookup(&self) -> Option<OsString>;
}

/// Explicit override captured from the environment at startup.
#[derive(Debug, Clone, Default)]
pub struct OverrideSource {
    value: Option<OsString>,
}

impl OverrideSource {
    pub fn new(value: Option<OsString>) -> Self {
        Self { value }
    }
}

#[async_trait]
impl SandboxSource for OverrideSource {
    fn origin(&self) -> SandboxOrigin {
        SandboxOrigin::Override
    }

    async fn lookup(&self) -> Option<OsString> {
        self.value.clone().filter(|value| !value.is_empty())
    }
}

/// Asks the external configuration tool for the default sandbox.
pub struct ConfigQuerySource {
    executor: Arc<dyn CommandExecutor>,
    invocation: CommandInvocation,
}

impl ConfigQuerySource {
    pub fn new(executor: Arc<dyn CommandExecutor>, invocation: CommandInvocation) -> Self {
        Self {
            executor,
            invocation,
        }
    }

    /// `<query_tool> config <query_key>` with the configured time limit.
    pub fn from_config(executor: Arc<dyn CommandExecutor>, config: &ClawConfig) -> Self {
        let sandbox = &config.sandbox;
        let invocation = CommandInvocation::new(
            sandbox.query_tool.clone(),
            [defaults::QUERY_SUBCOMMAND, sandbox.query_key.as_str()],
        )
        .with_timeout(sandbox.query_timeout());
        Self::new(executor, invocation)
    }
}

#[async_trait]
impl SandboxSource for ConfigQuerySource {
    fn origin(&self) -> SandboxOrigin {
        SandboxOrigin::Configured
    }

    async fn lookup(&self) -> Option<OsString> {
        let output = match self.executor.capture(&self.invocation).await {
            Ok(output) => output,
            Err(err @ ExecError::TimedOut { .. }) => {
                warn!(error = %err, "configuration query timed out; using fallback sandbox");
                return None;
            }
            Err(err) => {
                debug!(error = %err, "configuration query could not run");
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                command = %self.invocation.command_line(),
                exit_code = output.status.exit_code(),
                "configuration query failed"
            );
            return None;
        }

        let normalized = normalize_configured(&output.stdout);
        if normalized.is_none() {
            debug!(
                command = %self.invocation.command_line(),
                "configuration query returned no value"
            );
        }
        normalized.map(OsString::from)
    }
}

/// Last tier: a fixed name.
#[derive(Debug, Clone)]
pub struct FallbackSource {
    value: String,
}

impl FallbackSource {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[async_trait]
impl SandboxSource for FallbackSource {
    fn origin(&self) -> SandboxOrigin {
        SandboxOrigin::Default
    }

    async fn lookup(&self) -> Option<OsString> {
        Some(OsString::from(&self.value))
    }
}

/// Turn a configured sandbox reference into a development sandbox name.
///
/// Trailing newlines are dropped as shell command substitution drops them;
/// other whitespace is kept. Then keeps only the last path segment, drops
/// everything from its last `.`, and appends `_dev` unless already present.
/// Returns `None` only for empty output. A value with an empty stem such as
/// `.hidden` becomes `_dev`.
pub fn normalize_configured(raw: &str) -> Option<String> {
    let value = raw.trim_end_matches('\n');
    if value.is_empty() {
        return None;
    }

    let trimmed = value.trim_end_matches('/');
    let file_name = trimmed
        .rsplit_once('/')
        .map_or(trimmed, |(_parent, name)| name);
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _extension)| stem);

    if stem.ends_with(defaults::DEV_SUFFIX) {
        Some(stem.to_string())
    } else {
        Some(format!("{stem}{}", defaults::DEV_SUFFIX))
    }
}

/// Ordered chain of sources; the first non-empty answer wins.
#[derive(Default)]
pub struct SandboxResolver {
    sources: Vec<Box<dyn SandboxSource>>,
}

impl SandboxResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(mut self, source: impl SandboxSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Override, then configuration query, then fallback.
    pub fn from_config(config: &ClawConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self::new()
            .with_source(OverrideSource::new(
                config.runtime.sandbox_override.clone(),
            ))
            .with_source(ConfigQuerySource::from_config(executor, config))
            .with_source(FallbackSource::new(config.sandbox.fallback.clone()))
    }

    pub async fn resolve(&self) -> Resolution {
        for source in &self.sources {
            if let Some(name) = source.lookup().await.and_then(SandboxName::new) {
                let origin = source.origin();
                debug!(sandbox = %name, %origin, "resolved sandbox");
                return Resolution { name, origin };
            }
        }

        debug!("no source produced a sandbox; using built-in default");
        Resolution {
            name: SandboxName::builtin_default(),
            origin: SandboxOrigin::Default,
        }
    }
}
