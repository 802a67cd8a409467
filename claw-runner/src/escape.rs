//! Argument quoting for commands handed to the sandbox launcher.
//!
//! The launcher re-parses its command line through a shell inside the
//! sandbox, so a bare `*` would be glob-expanded there before `law` ever sees
//! it. Each `*` is therefore wrapped in double quotes, which the inner shell
//! strips again while keeping the character literal.
//!
//! Arguments are raw OS strings. Bytes that are not valid UTF-8 pass through
//! untouched.

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};

const WILDCARD: u8 = b'*';
const QUOTED_WILDCARD: &[u8] = b"\"*\"";

/// Quote every `*` in `arg` as `"*"`. All other bytes pass through.
#[cfg(unix)]
pub fn escape_wildcards(arg: &OsStr) -> Cow<'_, OsStr> {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes = arg.as_bytes();
    if !bytes.contains(&WILDCARD) {
        return Cow::Borrowed(arg);
    }

    let mut escaped = Vec::with_capacity(bytes.len() + QUOTED_WILDCARD.len());
    for &byte in bytes {
        if byte == WILDCARD {
            escaped.extend_from_slice(QUOTED_WILDCARD);
        } else {
            escaped.push(byte);
        }
    }
    Cow::Owned(OsString::from_vec(escaped))
}

/// Quote every `*` in `arg` as `"*"`. Arguments that are not valid Unicode
/// are passed through unchanged.
#[cfg(not(unix))]
pub fn escape_wildcards(arg: &OsStr) -> Cow<'_, OsStr> {
    let wildcard = char::from(WILDCARD);
    match arg.to_str() {
        Some(text) if text.contains(wildcard) => {
            let quoted = String::from_utf8_lossy(QUOTED_WILDCARD);
            Cow::Owned(OsString::from(text.replace(wildcard, &quoted)))
        }
        _ => Cow::Borrowed(arg),
    }
}

/// Render `program args...` as a single POSIX-shell-quoted line, for logs and
/// dry-run output. Invalid UTF-8 is shown lossily.
pub fn render_command_line<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    shell_words::join(
        std::iter::once(Cow::Borrowed(program))
            .chain(args.iter().map(|arg| arg.as_ref().to_string_lossy())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn escaped(arg: &str) -> OsString {
        escape_wildcards(OsStr::new(arg)).into_owned()
    }

    #[test]
    fn plain_arguments_are_borrowed_unchanged() {
        let escaped = escape_wildcards(OsStr::new("--param=1"));
        assert!(matches!(escaped, Cow::Borrowed(_)));
        assert_eq!(&*escaped, "--param=1");
    }

    #[test]
    fn every_wildcard_is_quoted() {
        assert_eq!(escaped("*"), "\"*\"");
        assert_eq!(
            escaped("--datasets=tt_*,st_*"),
            "--datasets=tt_\"*\",st_\"*\""
        );
    }

    #[test]
    fn other_glob_characters_are_left_alone() {
        assert_eq!(escaped("data?[0-9]"), "data?[0-9]");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_bytes_survive_quoting() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let raw = OsString::from_vec(b"tt_\xff*.root".to_vec());
        let quoted = escape_wildcards(&raw);
        assert_eq!(quoted.as_bytes(), b"tt_\xff\"*\".root");

        let plain = OsString::from_vec(b"file\xff.root".to_vec());
        assert_eq!(escape_wildcards(&plain), Cow::Borrowed(plain.as_os_str()));
    }

    #[test]
    fn command_line_quotes_arguments_with_spaces() {
        let line = render_command_line("cf_sandbox", &["venv_columnar_dev", "law", "run", "a b"]);
        assert_eq!(line, "cf_sandbox venv_columnar_dev law run 'a b'");
    }
}
