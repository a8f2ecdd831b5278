//! Recording adapter for the `DispatchEngine` port.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use super::record_result;
use crate::adapters::{
    Channel, Diagnostic, DispatchInput, DispatchOutput, MessageVisitor, DISPATCH_METHOD,
    ENGINE_PORT,
};
use crate::cassette::recorder::CassetteRecorder;
use crate::error::EngineError;
use crate::ports::{in_channel, DispatchEngine, DispatchStatus, ENGINE_CHANNEL};

/// Records dispatch interactions while delegating to an inner engine.
///
/// The inner engine's output and diagnostics are captured, stored in the
/// cassette and then passed on unchanged. Diagnostics are re-emitted on the
/// standard engine channel, which is what this adapter reports as its own.
pub struct RecordingEngine {
    inner: Box<dyn DispatchEngine>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingEngine {
    /// Creates a new recording engine wrapping the given implementation.
    pub fn new(inner: Box<dyn DispatchEngine>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl DispatchEngine for RecordingEngine {
    fn dispatch(
        &self,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<DispatchStatus, EngineError> {
        let collector = DiagnosticCollector {
            engine_channel: self.inner.diagnostics_channel().to_string(),
            diagnostics: Arc::default(),
        };
        let diagnostics = Arc::clone(&collector.diagnostics);

        let mut stdout = Vec::new();
        let subscriber = tracing_subscriber::registry().with(collector);
        let result = tracing::subscriber::with_default(subscriber, || {
            self.inner.dispatch(args, &mut stdout)
        });

        let diagnostics = std::mem::take(
            &mut *diagnostics.lock().unwrap_or_else(std::sync::PoisonError::into_inner),
        );
        let stdout = String::from_utf8_lossy(&stdout).into_owned();

        let recorded = result.as_ref().map(|status| DispatchOutput {
            status: *status,
            stdout: stdout.clone(),
            diagnostics: diagnostics.clone(),
        });
        let input = DispatchInput { args: args.to_vec() };
        record_result(&self.recorder, ENGINE_PORT, DISPATCH_METHOD, &input, &recorded);

        for diagnostic in &diagnostics {
            diagnostic.emit();
        }
        out.write_all(stdout.as_bytes())?;
        result
    }

    fn diagnostics_channel(&self) -> &str {
        ENGINE_CHANNEL
    }
}

/// Layer that keeps every event emitted while the inner engine runs.
struct DiagnosticCollector {
    engine_channel: String,
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl<S: Subscriber> Layer<S> for DiagnosticCollector {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let channel = if in_channel(metadata.target(), &self.engine_channel) {
            Channel::Engine
        } else {
            Channel::Root
        };
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let diagnostic = Diagnostic::new(channel, *metadata.level(), visitor.finish());
        if let Ok(mut guard) = self.diagnostics.lock() {
            guard.push(diagnostic);
        }
    }
}
