//! Replaying adapters that replay recorded interactions.

pub mod engine;

pub use engine::ReplayingEngine;

use serde::de::DeserializeOwned;

use crate::cassette::format::Interaction;
use crate::cassette::CassetteError;

/// Decode a recorded `Result<T, E>` interaction using the ok/err convention.
///
/// Mirror of `recording::record_result`. `Err` payloads come back as their
/// message.
pub(crate) fn replay_result<T>(interaction: &Interaction) -> Result<Result<T, String>, CassetteError>
where
    T: DeserializeOwned,
{
    let output = &interaction.output;
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Ok(Err(msg));
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map(Ok)
        .map_err(|e| CassetteError::Malformed { seq: interaction.seq, reason: e.to_string() })
}
