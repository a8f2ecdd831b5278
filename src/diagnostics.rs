//! Per-call capture of engine diagnostics.
//!
//! A [`DiagnosticsCapture`] owns an in-memory buffer and, while attached,
//! is the thread's default `tracing` dispatcher. Two thresholds apply at once:
//! the engine's own channel is kept from `engine_level` upwards, every other
//! target only at [`ROOT_LEVEL`]. Dropping the [`CaptureGuard`] restores
//! whatever dispatcher the caller had before, also during unwinding.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::subscriber::DefaultGuard;
use tracing::{Level, Metadata};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use crate::ports::in_channel;

/// Threshold for targets outside the engine channel. `tracing` has no level
/// above `ERROR`, so this is the emergency-only tap.
pub const ROOT_LEVEL: Level = Level::ERROR;

/// Default threshold for the engine's own channel.
pub const DEFAULT_ENGINE_LEVEL: Level = Level::WARN;

/// Cloneable handle to a byte buffer shared with the capture writer.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        let guard = self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        String::from_utf8_lossy(&guard).into_owned()
    }
}

/// Writer handed out to the fmt layer for each event.
pub(crate) struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().map_err(|_| io::Error::other("log buffer lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Captures diagnostics emitted during a single invocation.
pub struct DiagnosticsCapture {
    buffer: SharedBuffer,
    engine_channel: String,
    engine_level: Level,
}

/// Keeps a [`DiagnosticsCapture`] attached; detaches on drop.
#[must_use = "the capture is detached as soon as the guard is dropped"]
pub struct CaptureGuard {
    _default: DefaultGuard,
}

impl DiagnosticsCapture {
    /// Creates a detached capture for the given engine channel and threshold.
    #[must_use]
    pub fn new(engine_channel: impl Into<String>, engine_level: Level) -> Self {
        Self { buffer: SharedBuffer::default(), engine_channel: engine_channel.into(), engine_level }
    }

    /// Installs the capture as this thread's default dispatcher.
    ///
    /// Every `attach` is undone by dropping the returned guard.
    pub fn attach(&self) -> CaptureGuard {
        let channel = self.engine_channel.clone();
        let engine_level = self.engine_level;
        let filter = filter_fn(move |metadata: &Metadata<'_>| {
            let threshold =
                if in_channel(metadata.target(), &channel) { engine_level } else { ROOT_LEVEL };
            *metadata.level() <= threshold
        });
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(self.buffer.clone())
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_filter(filter);
        let subscriber = tracing_subscriber::registry().with(layer);
        CaptureGuard { _default: tracing::subscriber::set_default(subscriber) }
    }

    /// Returns everything captured so far, in emission order.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.contents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ENGINE_CHANNEL;

    fn lines(log: &str) -> Vec<&str> {
        log.lines().map(str::trim).collect()
    }

    fn emit_all_levels() {
        tracing::error!(target: "az_cli", "engine error");
        tracing::warn!(target: "az_cli", "engine warning");
        tracing::info!(target: "az_cli", "engine info");
        tracing::debug!(target: "az_cli::commands", "engine debug");
        tracing::error!(target: "urllib3", "root error");
        tracing::warn!(target: "urllib3", "root warning");
        tracing::info!("root info");
    }

    #[test]
    fn keeps_engine_warnings_and_root_errors_only() {
        let capture = DiagnosticsCapture::new(ENGINE_CHANNEL, DEFAULT_ENGINE_LEVEL);
        {
            let _guard = capture.attach();
            emit_all_levels();
        }
        let log = capture.contents();
        assert!(log.contains("engine error"));
        assert!(log.contains("engine warning"));
        assert!(!log.contains("engine info"));
        assert!(!log.contains("engine debug"));
        assert!(log.contains("root error"));
        assert!(!log.contains("root warning"));
        assert!(!log.contains("root info"));
    }

    #[test]
    fn sibling_targets_count_as_root() {
        let capture = DiagnosticsCapture::new(ENGINE_CHANNEL, DEFAULT_ENGINE_LEVEL);
        {
            let _guard = capture.attach();
            tracing::warn!(target: "az_cli_telemetry", "sibling warning");
            tracing::error!(target: "az_cli_telemetry", "sibling error");
        }
        assert_eq!(lines(&capture.contents()), ["sibling error"]);
    }

    #[test]
    fn engine_level_is_adjustable_without_touching_root() {
        let capture = DiagnosticsCapture::new(ENGINE_CHANNEL, Level::DEBUG);
        {
            let _guard = capture.attach();
            emit_all_levels();
        }
        let log = capture.contents();
        assert!(log.contains("engine info"));
        assert!(log.contains("engine debug"));
        assert!(!log.contains("root warning"));
    }

    #[test]
    fn lines_are_bare_messages_in_order() {
        let capture = DiagnosticsCapture::new(ENGINE_CHANNEL, DEFAULT_ENGINE_LEVEL);
        {
            let _guard = capture.attach();
            tracing::warn!(target: "az_cli", "first");
            tracing::error!(target: "az_cli", "second");
        }
        assert_eq!(lines(&capture.contents()), ["first", "second"]);
    }

    #[test]
    fn nothing_is_captured_after_detach() {
        let capture = DiagnosticsCapture::new(ENGINE_CHANNEL, DEFAULT_ENGINE_LEVEL);
        {
            let _guard = capture.attach();
            tracing::warn!(target: "az_cli", "inside");
        }
        tracing::warn!(target: "az_cli", "outside");
        assert_eq!(lines(&capture.contents()), ["inside"]);
    }

    #[test]
    fn detach_restores_outer_capture() {
        let outer = DiagnosticsCapture::new(ENGINE_CHANNEL, DEFAULT_ENGINE_LEVEL);
        let _outer_guard = outer.attach();
        {
            let inner = DiagnosticsCapture::new(ENGINE_CHANNEL, DEFAULT_ENGINE_LEVEL);
            let _inner_guard = inner.attach();
            tracing::warn!(target: "az_cli", "nested");
            assert_eq!(lines(&inner.contents()), ["nested"]);
        }
        tracing::warn!(target: "az_cli", "after");
        assert_eq!(lines(&outer.contents()), ["after"]);
    }
}
