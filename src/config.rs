//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use tracing::Level;

use crate::diagnostics::DEFAULT_ENGINE_LEVEL;
use crate::error::Error;

/// Executable used by the live engine when nothing else is configured.
pub const DEFAULT_AZ_PATH: &str = "az";

/// Environment variable naming the `az` executable.
pub const AZ_PATH_VAR: &str = "AZCALL_AZ_PATH";
/// Environment variable setting the engine-channel capture level.
pub const LOG_LEVEL_VAR: &str = "AZCALL_LOG_LEVEL";

/// Settings shared by the library entry point and the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Program launched by the live engine.
    pub az_path: PathBuf,
    /// Lowest level kept from the engine's diagnostics channel.
    pub engine_level: Level,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            az_path: PathBuf::from(DEFAULT_AZ_PATH),
            engine_level: DEFAULT_ENGINE_LEVEL,
        }
    }
}

impl AdapterConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `AZCALL_LOG_LEVEL` is not a valid level.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the log level value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();
        if let Some(path) = get(AZ_PATH_VAR) {
            config.az_path = PathBuf::from(path);
        }
        if let Some(level) = get(LOG_LEVEL_VAR) {
            config.engine_level = parse_level(LOG_LEVEL_VAR, &level)?;
        }
        Ok(config)
    }
}

static PROCESS_CONFIG: OnceLock<AdapterConfig> = OnceLock::new();

/// Returns the configuration read from the environment on first use.
///
/// Unlike [`AdapterConfig::from_env`], an invalid value does not fail: it is
/// logged at `warn` and the whole configuration falls back to its defaults.
pub fn process_config() -> &'static AdapterConfig {
    PROCESS_CONFIG.get_or_init(|| {
        AdapterConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring invalid azcall environment");
            AdapterConfig::default()
        })
    })
}

/// Parses a level name such as `warn` or `DEBUG`.
///
/// # Errors
///
/// Returns [`Error::Config`] naming `key` when the value is not a level.
pub fn parse_level(key: &'static str, value: &str) -> Result<Level, Error> {
    Level::from_str(value.trim()).map_err(|e| Error::Config {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AdapterConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AdapterConfig::default());
        assert_eq!(config.az_path, PathBuf::from("az"));
        assert_eq!(config.engine_level, Level::WARN);
    }

    #[test]
    fn reads_all_variables() {
        let config = AdapterConfig::from_lookup(lookup(&[
            (AZ_PATH_VAR, "/opt/az/bin/az"),
            (LOG_LEVEL_VAR, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.az_path, PathBuf::from("/opt/az/bin/az"));
        assert_eq!(config.engine_level, Level::DEBUG);
    }

    #[test]
    fn record_variable_is_left_to_the_binary() {
        let with_record = AdapterConfig::from_lookup(lookup(&[(
            "AZCALL_RECORD",
            "session.cassette.yaml",
        )]))
        .unwrap();
        assert_eq!(with_record, AdapterConfig::default());
    }

    #[test]
    fn empty_values_are_ignored() {
        let config =
            AdapterConfig::from_lookup(lookup(&[(AZ_PATH_VAR, ""), (LOG_LEVEL_VAR, "  ")])).unwrap();
        assert_eq!(config, AdapterConfig::default());
    }

    #[test]
    fn bad_level_is_reported() {
        let err = AdapterConfig::from_lookup(lookup(&[(LOG_LEVEL_VAR, "loud")])).unwrap_err();
        match err {
            Error::Config { key, value, .. } => {
                assert_eq!(key, LOG_LEVEL_VAR);
                assert_eq!(value, "loud");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
