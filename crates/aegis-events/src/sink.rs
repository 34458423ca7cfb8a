//! Diagnostic sinks.
//!
//! The consumer hands every stored event to one sink. The sink is a side
//! channel only; the store is the record of truth.

use parking_lot::Mutex;

use crate::event::{Event, Severity};

/// Receives each event after it has been appended to the store.
///
/// Called from the consumer thread. Implementations must not block for long,
/// and must not call back into the logger's write path.
pub trait EventSink: Send + Sync {
    /// Emits one event.
    fn emit(&self, event: &Event);
}

/// Renders the one-line diagnostic form of an event.
///
/// `<icon> [<category>] <module>/<severity>: <message> (TraceID: <trace_id>)`
#[must_use]
pub fn format_line(event: &Event) -> String {
    format!(
        "{} [{}] {}/{}: {} (TraceID: {})",
        event.severity().icon(),
        event.category(),
        event.module(),
        event.severity(),
        event.message(),
        event.trace_id()
    )
}

/// Default sink: one `tracing` record per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &Event) {
        let line = format_line(event);
        let category = event.category().as_str();
        let module = event.module();
        let trace_id = event.trace_id();
        match event.severity() {
            Severity::Warn => tracing::warn!(category, module, trace_id = %trace_id, "{line}"),
            Severity::Error | Severity::Critical => {
                tracing::error!(category, module, trace_id = %trace_id, "{line}");
            }
            Severity::Info | Severity::Other(_) => {
                tracing::info!(category, module, trace_id = %trace_id, "{line}");
            }
        }
    }
}

/// Sink that keeps formatted lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Creates an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line emitted so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &Event) {
        self.lines.lock().push(format_line(event));
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &Event) {}
}
