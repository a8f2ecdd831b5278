//! Error types raised by the adapter.
//!
//! Command-level failures (request errors, parse errors, missing resources)
//! are not errors here: they come back as the `exit_code` of an
//! [`InvocationResult`](crate::result::InvocationResult). Only problems that
//! keep the adapter from producing a result are raised.

use thiserror::Error;

use crate::cassette::CassetteError;

/// Failure reported by a dispatch engine that could not run a command at all.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine executable could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading from or writing to the engine's streams failed.
    #[error("engine I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A recorded interaction could not be replayed.
    #[error(transparent)]
    Cassette(#[from] CassetteError),
    /// Any other engine-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Errors raised by [`invoke`](crate::invoke) and [`Adapter`](crate::Adapter).
#[derive(Debug, Error)]
pub enum Error {
    /// The command string has unbalanced quotes or a dangling escape.
    #[error("cannot tokenize command `{command}`: unbalanced quote or trailing escape")]
    Tokenize {
        /// The rejected command string.
        command: String,
    },
    /// The engine wrote output that is neither empty nor JSON.
    #[error("engine output is not valid JSON: {source}")]
    OutputDecode {
        /// Raw text captured from the output sink.
        output: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The engine failed before producing a completion status.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A configuration value could not be parsed.
    #[error("invalid value `{value}` for {key}: {reason}")]
    Config {
        /// Environment variable or flag name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
