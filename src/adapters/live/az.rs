//! Live dispatch engine that runs the `az` executable.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::EngineError;
use crate::ports::engine::{DispatchEngine, DispatchStatus, ENGINE_CHANNEL, REQUEST_ERROR_CODE};

/// Runs commands through the Azure CLI executable.
///
/// Standard output becomes the command output. Each standard error line is
/// re-emitted on the engine channel at the level its prefix names.
#[derive(Debug, Clone)]
pub struct LiveAzEngine {
    program: PathBuf,
    force_json: bool,
}

impl LiveAzEngine {
    /// Creates an engine that launches `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), force_json: true }
    }

    /// Controls whether `--output json` is appended when no format is given.
    #[must_use]
    pub fn force_json(mut self, force_json: bool) -> Self {
        self.force_json = force_json;
        self
    }

    /// Program this engine launches.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command_args(&self, args: &[String]) -> Vec<String> {
        let mut argv = args.to_vec();
        if self.force_json && !selects_output_format(args) {
            argv.push("--output".into());
            argv.push("json".into());
        }
        argv
    }
}

impl DispatchEngine for LiveAzEngine {
    fn dispatch(
        &self,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<DispatchStatus, EngineError> {
        let output = Command::new(&self.program)
            .args(self.command_args(args))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        out.write_all(&output.stdout)?;
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            emit_stderr_line(line);
        }

        // Killed by a signal: no code to report, treat as a failed request.
        Ok(output
            .status
            .code()
            .map_or(DispatchStatus::RequestFailed(REQUEST_ERROR_CODE), DispatchStatus::from_code))
    }
}

/// Returns `true` if the arguments already pick an output format.
fn selects_output_format(args: &[String]) -> bool {
    args.iter().any(|arg| {
        arg == "-o" || arg == "--output" || arg.starts_with("--output=") || arg.starts_with("-o=")
    })
}

/// Re-emits one line of `az` standard error on the engine channel.
fn emit_stderr_line(line: &str) {
    let line = line.trim_end();
    if line.is_empty() {
        return;
    }
    if let Some(message) = line.strip_prefix("ERROR: ") {
        tracing::error!(target: ENGINE_CHANNEL, "{message}");
    } else if let Some(message) = line.strip_prefix("WARNING: ") {
        tracing::warn!(target: ENGINE_CHANNEL, "{message}");
    } else if let Some(message) = line.strip_prefix("INFO: ") {
        tracing::info!(target: ENGINE_CHANNEL, "{message}");
    } else if let Some(message) = line.strip_prefix("DEBUG: ") {
        tracing::debug!(target: ENGINE_CHANNEL, "{message}");
    } else {
        tracing::warn!(target: ENGINE_CHANNEL, "{line}");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use super::*;
    use crate::diagnostics::{DiagnosticsCapture, DEFAULT_ENGINE_LEVEL};

    fn fake_az(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("az");
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn appends_json_output_unless_format_given() {
        let engine = LiveAzEngine::new("az");
        assert_eq!(
            engine.command_args(&args(&["group", "list"])),
            args(&["group", "list", "--output", "json"])
        );
        assert_eq!(
            engine.command_args(&args(&["group", "list", "-o", "tsv"])),
            args(&["group", "list", "-o", "tsv"])
        );
        let plain = LiveAzEngine::new("az").force_json(false);
        assert_eq!(plain.command_args(&args(&["version"])), args(&["version"]));
    }

    #[test]
    fn copies_stdout_and_maps_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let az = fake_az(dir.path(), r#"echo '{"args": "'"$*"'"}'; exit 0"#);
        let engine = LiveAzEngine::new(az);

        let mut out = Vec::new();
        let status = engine.dispatch(&args(&["group", "show", "-n", "g"]), &mut out).unwrap();
        assert_eq!(status, DispatchStatus::Success);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["args"], "group show -n g --output json");
    }

    #[test]
    fn not_found_exit_and_stderr_are_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let az = fake_az(
            dir.path(),
            "echo 'ERROR: (ResourceGroupNotFound) missing' >&2\necho 'INFO: chatter' >&2\nexit 3",
        );
        let engine = LiveAzEngine::new(az);

        let capture = DiagnosticsCapture::new(ENGINE_CHANNEL, DEFAULT_ENGINE_LEVEL);
        let mut out = Vec::new();
        let status = {
            let _guard = capture.attach();
            engine.dispatch(&args(&["group", "show", "-n", "g"]), &mut out).unwrap()
        };
        assert_eq!(status, DispatchStatus::NotFound);
        assert!(out.is_empty());
        let log = capture.contents();
        assert!(log.contains("(ResourceGroupNotFound) missing"));
        assert!(!log.contains("chatter"));
    }

    #[test]
    fn usage_errors_are_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let az = fake_az(dir.path(), "echo 'usage: az group show' >&2\nexit 2");
        let capture = DiagnosticsCapture::new(ENGINE_CHANNEL, DEFAULT_ENGINE_LEVEL);
        let mut out = Vec::new();
        let status = {
            let _guard = capture.attach();
            LiveAzEngine::new(az).dispatch(&args(&["group", "show"]), &mut out).unwrap()
        };
        assert_eq!(status, DispatchStatus::ParseFailed);
        assert!(capture.contents().contains("usage: az group show"));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let engine = LiveAzEngine::new("/nonexistent/azcall-test/az");
        let err = engine.dispatch(&args(&["version"]), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }
}
