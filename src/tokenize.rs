//! POSIX shell-word splitting for command strings.

use crate::error::Error;

/// Splits a command string into arguments using POSIX shell rules.
///
/// Whitespace separates words, single and double quotes group them, and a
/// backslash escapes the next character outside single quotes.
///
/// # Errors
///
/// Returns [`Error::Tokenize`] for unbalanced quotes or a trailing backslash.
pub fn split(command: &str) -> Result<Vec<String>, Error> {
    shlex::split(command).ok_or_else(|| Error::Tokenize { command: command.to_string() })
}

/// Joins arguments back into a single shell-quoted string, for logging.
#[must_use]
pub fn join(args: &[String]) -> String {
    shlex::try_join(args.iter().map(String::as_str)).unwrap_or_else(|_| args.join(" "))
}
