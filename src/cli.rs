//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::config::{parse_level, AdapterConfig, LOG_LEVEL_VAR};

/// Top-level CLI parser for `azcall`.
#[derive(Debug, Parser)]
#[command(
    name = "azcall",
    version,
    about = "Run an Azure CLI command and print its JSON result or captured log"
)]
pub struct Cli {
    /// The command to run, without the leading `az`, e.g. "group show -n mygroup".
    pub command: String,

    /// Azure CLI executable to launch.
    #[arg(long, env = "AZCALL_AZ_PATH", default_value = "az")]
    pub az_path: PathBuf,

    /// Lowest level captured from the Azure CLI's own log channel.
    #[arg(long, env = "AZCALL_LOG_LEVEL", default_value = "warn", value_parser = parse_level_arg)]
    pub log_level: Level,

    /// Record the engine interaction to this cassette file.
    ///
    /// Only the binary records; the library entry point never does.
    #[arg(long, env = "AZCALL_RECORD", conflicts_with = "replay")]
    pub record: Option<PathBuf>,

    /// Replay the engine interaction from this cassette file instead of running `az`.
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Exit with the command's exit code instead of 0.
    #[arg(long)]
    pub propagate_exit_code: bool,

    /// Log adapter activity to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Adapter settings selected by the flags.
    #[must_use]
    pub fn config(&self) -> AdapterConfig {
        AdapterConfig {
            az_path: self.az_path.clone(),
            engine_level: self.log_level,
        }
    }
}

fn parse_level_arg(value: &str) -> Result<Level, String> {
    parse_level(LOG_LEVEL_VAR, value).map_err(|err| err.to_string())
}
