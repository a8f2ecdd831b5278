//! Run Azure CLI commands as a function call.
//!
//! [`invoke`] takes a command string (without the leading `az`), runs it
//! through a dispatch engine and returns the exit code, the decoded JSON
//! output and the captured log as an [`InvocationResult`]:
//!
//! ```no_run
//! let result = azcall::invoke("group show -n mygroup")?;
//! if result.is_success() {
//!     println!("{}", result.result["location"]);
//! } else {
//!     eprint!("{}", result.log);
//! }
//! # Ok::<(), azcall::Error>(())
//! ```

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod invoke;
pub mod logging;
pub mod ports;
pub mod result;
pub mod tokenize;

use clap::error::ErrorKind;
use clap::Parser;

pub use error::{EngineError, Error};
pub use invoke::{Adapter, InvokeOptions};
pub use ports::{DispatchEngine, DispatchStatus};
pub use result::InvocationResult;

/// Invoke `command` against the process-wide live engine.
///
/// The engine and capture level come from `AZCALL_AZ_PATH` and
/// `AZCALL_LOG_LEVEL`, read once per process. An unparsable level is logged
/// and the default (`warn`) is used instead; call
/// [`config::AdapterConfig::from_env`] to have it reported as an error.
///
/// Exit codes: `0` success, `1` request error, `2` command parsing error,
/// `3` resource does not exist. These are returned, not raised.
///
/// # Errors
///
/// Returns an error for malformed quoting, when `az` cannot be launched, or
/// when its output is not JSON.
pub fn invoke(command: &str) -> Result<InvocationResult, Error> {
    let options = InvokeOptions { engine_level: config::process_config().engine_level };
    Adapter::with_options(adapters::live::default_engine(), options).invoke(command)
}

/// Run the CLI with the provided arguments and return the process exit code.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<i32, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print().map_err(|e| format!("failed to write help: {e}"))?;
            return Ok(0);
        }
        Err(err) => return Err(err.to_string()),
    };
    // A subscriber may already be installed by an embedding host.
    let _ = logging::init(cli.verbose);
    let mut stdout = std::io::stdout().lock();
    let result = commands::execute(&cli, &mut stdout)?;
    Ok(if cli.propagate_exit_code { result.exit_code } else { 0 })
}
