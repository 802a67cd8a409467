use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

/// Immutable copy of the process environment taken at startup.
///
/// Values are kept as raw OS strings. [`EnvSnapshot::get`] only sees values
/// that are valid UTF-8; [`EnvSnapshot::get_os`] sees all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<OsString, OsString>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        std::env::vars_os().collect()
    }

    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key).and_then(OsStr::to_str)
    }

    /// The value of `key` if it is set and not empty. The value itself is
    /// returned untrimmed.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Like [`EnvSnapshot::non_empty`], but also returns values that are not
    /// valid UTF-8.
    pub fn non_empty_os(&self, key: &str) -> Option<&OsStr> {
        self.get_os(key).filter(|value| !value.is_empty())
    }

    /// Interpret `key` as a boolean switch, falling back to `default` when it
    /// is unset or unrecognized.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(parse_bool).unwrap_or(default)
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
