//! The command adapter: string in, exit code, JSON and log out.

use tracing::Level;

use crate::diagnostics::{DiagnosticsCapture, DEFAULT_ENGINE_LEVEL};
use crate::error::Error;
use crate::ports::DispatchEngine;
use crate::result::{decode_output, InvocationResult};
use crate::tokenize;

/// Per-adapter settings.
#[derive(Debug, Clone, Copy)]
pub struct InvokeOptions {
    /// Lowest level kept from the engine's own diagnostics channel.
    pub engine_level: Level,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self { engine_level: DEFAULT_ENGINE_LEVEL }
    }
}

/// Runs command strings against a dispatch engine.
///
/// The adapter holds no state between calls. Each call gets fresh output and
/// diagnostics buffers that are gone once it returns.
pub struct Adapter<'e> {
    engine: &'e dyn DispatchEngine,
    options: InvokeOptions,
}

impl<'e> Adapter<'e> {
    /// Creates an adapter over `engine` with default options.
    #[must_use]
    pub fn new(engine: &'e dyn DispatchEngine) -> Self {
        Self::with_options(engine, InvokeOptions::default())
    }

    /// Creates an adapter over `engine` with explicit options.
    #[must_use]
    pub fn with_options(engine: &'e dyn DispatchEngine, options: InvokeOptions) -> Self {
        Self { engine, options }
    }

    /// Invokes `command` (without the program name) and collects its results.
    ///
    /// Request, parse and not-found failures come back as the result's
    /// `exit_code`; they are never raised.
    ///
    /// # Errors
    ///
    /// - [`Error::Tokenize`] if the command has malformed quoting.
    /// - [`Error::Engine`] if the engine could not run at all.
    /// - [`Error::OutputDecode`] if the engine wrote output that is not JSON.
    pub fn invoke(&self, command: &str) -> Result<InvocationResult, Error> {
        let args = tokenize::split(command)?;
        tracing::debug!(command = %tokenize::join(&args), "dispatching");

        let capture =
            DiagnosticsCapture::new(self.engine.diagnostics_channel(), self.options.engine_level);
        let mut output = Vec::new();
        let dispatched = {
            let _attached = capture.attach();
            self.engine.dispatch(&args, &mut output)
        };
        let status = dispatched?;

        let output = String::from_utf8_lossy(&output);
        let result = decode_output(&output)?;
        let exit_code = status.exit_code();
        tracing::debug!(exit_code, "dispatch finished");

        Ok(InvocationResult { exit_code, result, log: capture.contents() })
    }
}
