//! Cassette format for recording and replaying engine interactions.

pub mod format;
pub mod recorder;
pub mod replayer;

use thiserror::Error;

/// Errors raised while loading or replaying a cassette.
#[derive(Debug, Error)]
pub enum CassetteError {
    /// The cassette file could not be read or written.
    #[error("cassette {path}: {source}")]
    Io {
        /// Cassette file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The cassette file is not valid cassette YAML.
    #[error("cassette {path} is malformed: {source}")]
    Yaml {
        /// Cassette file path.
        path: String,
        /// Decoder error.
        #[source]
        source: serde_yaml::Error,
    },
    /// No interaction was ever recorded for the requested port and method.
    #[error(
        "no interactions recorded for port={port:?} method={method:?}; available: [{available}]"
    )]
    Unknown {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// Recorded `port::method` pairs.
        available: String,
    },
    /// Every recorded interaction for the port and method was consumed.
    #[error(
        "cassette exhausted: all {count} interactions for port={port:?} method={method:?} \
         have been consumed"
    )]
    Exhausted {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// Number of interactions that were recorded.
        count: usize,
    },
    /// A recorded interaction does not have the shape the adapter expects.
    #[error("interaction seq={seq} is malformed: {reason}")]
    Malformed {
        /// Sequence number of the interaction.
        seq: u64,
        /// What was wrong with it.
        reason: String,
    },
    /// The replayed call does not match what was recorded.
    #[error("interaction seq={seq} was recorded for `{recorded}`, replayed with `{requested}`")]
    Mismatch {
        /// Sequence number of the interaction.
        seq: u64,
        /// Command line stored in the cassette.
        recorded: String,
        /// Command line being replayed.
        requested: String,
    },
}
