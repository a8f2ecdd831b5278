//! The record returned from a single invocation.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::ports::engine::SUCCESS_CODE;

/// Exit code, decoded output and captured log of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    /// `0` on success, `1` request error, `2` parse error, `3` not found.
    pub exit_code: i32,
    /// Decoded JSON output, or an empty object when the command printed nothing.
    pub result: Value,
    /// Diagnostic text captured while the command ran.
    pub log: String,
}

impl InvocationResult {
    /// Returns `true` when the command exited with code `0`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == SUCCESS_CODE
    }
}

/// Decodes the text captured from the output sink.
///
/// Empty (or whitespace-only) output decodes to an empty JSON object.
///
/// # Errors
///
/// Returns [`Error::OutputDecode`] when non-empty output is not valid JSON.
pub fn decode_output(output: &str) -> Result<Value, Error> {
    if output.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(output)
        .map_err(|source| Error::OutputDecode { output: output.to_string(), source })
}
