//! Dispatch engine port for running tokenized CLI commands.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Diagnostics channel used by engines that do not name their own.
pub const ENGINE_CHANNEL: &str = "az_cli";

/// Exit code for a successful command.
pub const SUCCESS_CODE: i32 = 0;
/// Exit code for a request-level failure.
pub const REQUEST_ERROR_CODE: i32 = 1;
/// Exit code for a command the engine could not parse.
pub const PARSE_ERROR_CODE: i32 = 2;
/// Exit code for a command referencing a resource that does not exist.
pub const NOT_FOUND_CODE: i32 = 3;

/// How a dispatched command completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// The command ran and succeeded.
    Success,
    /// The command ran and the request failed with the given code.
    RequestFailed(i32),
    /// The command line was rejected by the engine's parser.
    ParseFailed,
    /// The command referenced a resource that does not exist.
    NotFound,
}

impl DispatchStatus {
    /// Maps a process-style exit code to a status.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            SUCCESS_CODE => Self::Success,
            PARSE_ERROR_CODE => Self::ParseFailed,
            NOT_FOUND_CODE => Self::NotFound,
            other => Self::RequestFailed(other),
        }
    }

    /// Returns the exit code reported to callers.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => SUCCESS_CODE,
            Self::RequestFailed(code) => code,
            Self::ParseFailed => PARSE_ERROR_CODE,
            Self::NotFound => NOT_FOUND_CODE,
        }
    }
}

/// Runs tokenized commands and writes their primary output to a sink.
///
/// Diagnostics are emitted as `tracing` events. Events whose target is
/// [`diagnostics_channel`](Self::diagnostics_channel) or one of its `::`
/// children belong to the engine's own channel; everything else is treated
/// as root-level noise.
pub trait DispatchEngine: Send + Sync {
    /// Dispatches `args` and writes the command's output into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the engine cannot run the command at all.
    /// Command failures are reported through [`DispatchStatus`].
    fn dispatch(&self, args: &[String], out: &mut dyn Write)
        -> Result<DispatchStatus, EngineError>;

    /// Name of the engine's own diagnostics channel (a `tracing` target).
    fn diagnostics_channel(&self) -> &str {
        ENGINE_CHANNEL
    }
}

/// Returns `true` if `target` is `channel` itself or nested below it.
///
/// `az_cli::commands` is in `az_cli`; `az_cli_telemetry` is not.
#[must_use]
pub fn in_channel(target: &str, channel: &str) -> bool {
    target
        .strip_prefix(channel)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl<F> DispatchEngine for F
where
    F: Fn(&[String], &mut dyn Write) -> Result<DispatchStatus, EngineError> + Send + Sync,
{
    fn dispatch(
        &self,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<DispatchStatus, EngineError> {
        self(args, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_statuses() {
        assert_eq!(DispatchStatus::from_code(0), DispatchStatus::Success);
        assert_eq!(DispatchStatus::from_code(1), DispatchStatus::RequestFailed(1));
        assert_eq!(DispatchStatus::from_code(2), DispatchStatus::ParseFailed);
        assert_eq!(DispatchStatus::from_code(3), DispatchStatus::NotFound);
        assert_eq!(DispatchStatus::from_code(130), DispatchStatus::RequestFailed(130));
    }

    #[test]
    fn channel_membership_follows_path_segments() {
        assert!(in_channel("az_cli", "az_cli"));
        assert!(in_channel("az_cli::commands", "az_cli"));
        assert!(!in_channel("az_cli_telemetry", "az_cli"));
        assert!(!in_channel("az", "az_cli"));
        assert!(!in_channel("urllib3", "az_cli"));
    }

    #[test]
    fn statuses_map_back_to_codes() {
        for code in [0, 1, 2, 3, 42] {
            assert_eq!(DispatchStatus::from_code(code).exit_code(), code);
        }
    }

    #[test]
    fn closures_are_engines() {
        let engine = |args: &[String], out: &mut dyn Write| -> Result<DispatchStatus, EngineError> {
            write!(out, "{}", args.len())?;
            Ok(DispatchStatus::Success)
        };
        let mut buf = Vec::new();
        let status = engine.dispatch(&["a".into(), "b".into()], &mut buf).unwrap();
        assert_eq!(status, DispatchStatus::Success);
        assert_eq!(buf, b"2");
        assert_eq!(engine.diagnostics_channel(), ENGINE_CHANNEL);
    }
}
