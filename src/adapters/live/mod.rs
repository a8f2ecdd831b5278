//! Live adapters for real external interactions.

pub mod az;

use std::sync::OnceLock;

pub use az::LiveAzEngine;

use crate::config::process_config;

static DEFAULT_ENGINE: OnceLock<LiveAzEngine> = OnceLock::new();

/// Returns the process-wide live engine, building it on first use.
///
/// The program path comes from `AZCALL_AZ_PATH`, falling back to `az`.
pub fn default_engine() -> &'static LiveAzEngine {
    DEFAULT_ENGINE.get_or_init(|| LiveAzEngine::new(&process_config().az_path))
}
