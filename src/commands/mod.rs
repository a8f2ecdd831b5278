//! Command execution for the `azcall` binary.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::adapters::live::LiveAzEngine;
use crate::adapters::recording::RecordingEngine;
use crate::adapters::replaying::ReplayingEngine;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::cli::Cli;
use crate::invoke::{Adapter, InvokeOptions};
use crate::ports::DispatchEngine;
use crate::result::InvocationResult;

/// Run the command selected by `cli` and print its result to `out`.
///
/// Prints the pretty JSON result when the command succeeded and the captured
/// log otherwise. When `--record` is given the cassette is written even if
/// the command failed.
///
/// # Errors
///
/// Returns an error string if the adapter raised or the cassette could not be
/// read or written.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<InvocationResult, String> {
    let config = cli.config();
    let options = InvokeOptions { engine_level: config.engine_level };

    let live = || LiveAzEngine::new(&config.az_path);
    let mut recorder = None;
    let engine: Box<dyn DispatchEngine> = if let Some(path) = &cli.replay {
        let replayer = CassetteReplayer::load(path).map_err(|e| e.to_string())?;
        Box::new(ReplayingEngine::new(replayer))
    } else if let Some(path) = &cli.record {
        let shared = Arc::new(Mutex::new(CassetteRecorder::new(path, cassette_name(path))));
        recorder = Some(Arc::clone(&shared));
        Box::new(RecordingEngine::new(Box::new(live()), shared))
    } else {
        Box::new(live())
    };

    let result = Adapter::with_options(&*engine, options).invoke(&cli.command);

    // Finish recording after the command completes (even on error)
    if let Some(recorder) = recorder {
        // Drop the engine first to release its recorder reference
        drop(engine);
        finish_recording(recorder)?;
    }

    let result = result.map_err(|e| e.to_string())?;
    print_result(&result, out).map_err(|e| format!("failed to write output: {e}"))?;
    Ok(result)
}

/// Print the decoded result on success, the captured log otherwise.
fn print_result(result: &InvocationResult, out: &mut dyn Write) -> std::io::Result<()> {
    if result.is_success() {
        let pretty = serde_json::to_string_pretty(&result.result).map_err(std::io::Error::other)?;
        writeln!(out, "{pretty}")
    } else {
        write!(out, "{}", result.log)
    }
}

fn cassette_name(path: &Path) -> String {
    path.file_stem().map_or_else(|| "azcall".to_string(), |stem| stem.to_string_lossy().into_owned())
}

/// Write the recorded cassette and report where it went.
fn finish_recording(recorder: Arc<Mutex<CassetteRecorder>>) -> Result<(), String> {
    let recorder = Arc::try_unwrap(recorder)
        .map_err(|_| "recording engine still holds the recorder".to_string())?
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    let path = recorder.finish().map_err(|e| e.to_string())?;
    tracing::info!(path = %path.display(), "recording saved");
    Ok(())
}
