//! Replaying adapter for the `DispatchEngine` port.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use super::replay_result;
use crate::adapters::{DispatchInput, DispatchOutput, DISPATCH_METHOD, ENGINE_PORT};
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::CassetteError;
use crate::error::EngineError;
use crate::ports::{DispatchEngine, DispatchStatus, ENGINE_CHANNEL};
use crate::tokenize;

/// Replays recorded dispatch results from a cassette.
///
/// Each call consumes the next recorded interaction. The arguments must match
/// the recorded ones unless argument checking is turned off.
pub struct ReplayingEngine {
    replayer: Mutex<CassetteReplayer>,
    check_args: bool,
}

impl ReplayingEngine {
    /// Creates a new replaying engine from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer), check_args: true }
    }

    /// Serve interactions in order regardless of the arguments passed.
    #[must_use]
    pub fn ignore_args(mut self) -> Self {
        self.check_args = false;
        self
    }
}

impl DispatchEngine for ReplayingEngine {
    fn dispatch(
        &self,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<DispatchStatus, EngineError> {
        let (seq, input, recorded) = {
            let mut replayer = self.replayer.lock().unwrap_or_else(PoisonError::into_inner);
            let interaction = replayer.next_interaction(ENGINE_PORT, DISPATCH_METHOD)?;
            let recorded = replay_result::<DispatchOutput>(interaction)?;
            (interaction.seq, interaction.input.clone(), recorded)
        };

        if self.check_args {
            let recorded_args = serde_json::from_value::<DispatchInput>(input)
                .map_err(|e| CassetteError::Malformed { seq, reason: e.to_string() })?
                .args;
            if recorded_args != args {
                return Err(CassetteError::Mismatch {
                    seq,
                    recorded: tokenize::join(&recorded_args),
                    requested: tokenize::join(args),
                }
                .into());
            }
        }

        let output = recorded.map_err(EngineError::Other)?;
        for diagnostic in &output.diagnostics {
            diagnostic.emit();
        }
        out.write_all(output.stdout.as_bytes())?;
        Ok(output.status)
    }

    fn diagnostics_channel(&self) -> &str {
        ENGINE_CHANNEL
    }
}
