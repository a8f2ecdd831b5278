//! Engine adapters: the live `az` process plus cassette record/replay.
//!
//! Record and replay share the payload types below so a cassette written by
//! [`recording::RecordingEngine`] can be served by
//! [`replaying::ReplayingEngine`].

pub mod live;
pub mod recording;
pub mod replaying;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::field::{Field, Visit};
use tracing::Level;

use crate::ports::engine::{DispatchStatus, ENGINE_CHANNEL};

/// Port name used for engine interactions in cassettes.
pub const ENGINE_PORT: &str = "engine";
/// Method name used for dispatch interactions in cassettes.
pub const DISPATCH_METHOD: &str = "dispatch";
/// Target used when replaying diagnostics that came from outside the engine channel.
pub const ROOT_TARGET: &str = "azcall::root";

/// Which diagnostics channel a recorded message was emitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// The engine's own channel.
    Engine,
    /// Anything else.
    Root,
}

/// One diagnostic message captured while recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Channel the message was emitted on.
    pub channel: Channel,
    /// Lowercase level name (`error`, `warn`, ...).
    pub level: String,
    /// Rendered message text.
    pub message: String,
}

/// Recorded input of a dispatch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DispatchInput {
    pub(crate) args: Vec<String>,
}

/// Recorded outcome of a dispatch call that completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DispatchOutput {
    pub(crate) status: DispatchStatus,
    #[serde(default)]
    pub(crate) stdout: String,
    #[serde(default)]
    pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Emits `message` on a constant `target` at a runtime `level`.
macro_rules! emit_at {
    ($target:expr, $level:expr, $message:expr) => {{
        let level = $level;
        if level == Level::ERROR {
            tracing::error!(target: $target, "{}", $message);
        } else if level == Level::WARN {
            tracing::warn!(target: $target, "{}", $message);
        } else if level == Level::INFO {
            tracing::info!(target: $target, "{}", $message);
        } else if level == Level::DEBUG {
            tracing::debug!(target: $target, "{}", $message);
        } else {
            tracing::trace!(target: $target, "{}", $message);
        }
    }};
}

impl Diagnostic {
    /// Builds a diagnostic from a level and a message.
    #[must_use]
    pub fn new(channel: Channel, level: Level, message: impl Into<String>) -> Self {
        Self { channel, level: level.to_string().to_ascii_lowercase(), message: message.into() }
    }

    /// Re-emits the message as a `tracing` event on its channel.
    ///
    /// Unknown level names are emitted at `WARN`.
    pub fn emit(&self) {
        let level = Level::from_str(&self.level).unwrap_or(Level::WARN);
        let message = self.message.as_str();
        match self.channel {
            Channel::Engine => emit_at!(ENGINE_CHANNEL, level, message),
            Channel::Root => emit_at!(ROOT_TARGET, level, message),
        }
    }
}

/// Collects the message and fields of an event into one line.
#[derive(Default)]
pub(crate) struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    pub(crate) fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}
