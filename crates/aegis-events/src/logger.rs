//! The event logger.
//!
//! Producers call [`EventLogger::log`] from any thread. A single consumer
//! thread moves events from the bounded queue into the append-only store,
//! then hands them to the sink and to live subscribers. Readers take a
//! shared lock on the store; only the consumer ever takes the exclusive one.
//!
//! ```text
//! producers ──log──▶ [bounded queue] ──pop──▶ consumer ──append──▶ store
//!                                                 │
//!                                                 ├──▶ sink (diagnostic line)
//!                                                 └──▶ subscribers (broadcast)
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{JoinHandle, ThreadId};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::config::{LoggerConfig, OverflowPolicy, ValidationMode};
use crate::error::{LogError, Result};
use crate::event::{Category, Event, EventDraft, Metadata, Severity, TraceId};
use crate::export;
use crate::metrics::{LoggerMetrics, LoggerStats};
use crate::queue::{EventQueue, Pushed};
use crate::sink::{EventSink, TracingSink};

const CONSUMER_THREAD_NAME: &str = "aegis-event-consumer";

/// State shared between the logger handle and the consumer thread.
struct Shared {
    queue: EventQueue,
    store: RwLock<Vec<Event>>,
    sink: Arc<dyn EventSink>,
    metrics: LoggerMetrics,
    live: broadcast::Sender<Event>,
}

/// Bounded, asynchronous, append-only event logger.
///
/// Share it with `Arc<EventLogger>`; every method takes `&self`.
/// Dropping the last handle shuts the logger down and drains the queue.
pub struct EventLogger {
    shared: Arc<Shared>,
    /// Held across the join so every `shutdown` caller waits for the drain.
    consumer: Mutex<Option<JoinHandle<()>>>,
    consumer_id: ThreadId,
    config: LoggerConfig,
}

impl std::fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLogger")
            .field("config", &self.config)
            .field("stored", &self.len())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl EventLogger {
    /// Creates a logger with the given queue capacity and default settings.
    ///
    /// # Errors
    /// Returns `LogError::Config` if `buffer_size` is 0.
    pub fn new(buffer_size: usize) -> Result<Self> {
        Self::with_config(LoggerConfig::new(buffer_size))
    }

    /// Creates a logger that reports through [`TracingSink`].
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the consumer
    /// thread cannot be spawned.
    pub fn with_config(config: LoggerConfig) -> Result<Self> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Creates a logger with a custom diagnostic sink.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the consumer
    /// thread cannot be spawned.
    pub fn with_sink(config: LoggerConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;

        let (live, _) = broadcast::channel(config.subscriber_capacity);
        let shared = Arc::new(Shared {
            queue: EventQueue::new(&config),
            store: RwLock::new(Vec::new()),
            sink,
            metrics: LoggerMetrics::default(),
            live,
        });

        let consumer = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name(CONSUMER_THREAD_NAME.to_string())
                .spawn(move || run_consumer(&shared))?
        };

        tracing::debug!(
            buffer_size = config.buffer_size,
            overflow = ?config.overflow,
            validation = ?config.validation,
            "event logger started"
        );

        Ok(Self {
            shared,
            consumer_id: consumer.thread().id(),
            consumer: Mutex::new(Some(consumer)),
            config,
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &LoggerConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Write path
    // ═══════════════════════════════════════════════════════════════════════════

    /// Logs an event built from its parts.
    ///
    /// Returns the new event's trace ID. The event is visible to readers once
    /// the consumer has stored it; see [`EventLogger::flush`].
    pub fn log_event(
        &self,
        category: Category,
        module: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        metadata: Metadata,
    ) -> Result<TraceId> {
        self.log(EventDraft::new(category, module, severity, message).with_metadata_map(metadata))
    }

    /// Logs an event whose category and severity arrive as text.
    ///
    /// In strict mode labels are matched case-insensitively and anything
    /// unrecognised is rejected. In permissive mode only exact wire labels
    /// are recognised; everything else, `"info"` included, is stored
    /// verbatim as `Other`.
    pub fn log_event_str(
        &self,
        category: &str,
        module: impl Into<String>,
        severity: &str,
        message: impl Into<String>,
        metadata: Metadata,
    ) -> Result<TraceId> {
        let (category, severity) = match self.config.validation {
            ValidationMode::Strict => (Category::parse(category), Severity::parse(severity)),
            ValidationMode::Permissive => (
                Category::parse_exact(category),
                Severity::parse_exact(severity),
            ),
        };
        self.log_event(category, module, severity, message, metadata)
    }

    /// Stamps, validates and enqueues a draft.
    ///
    /// Blocks only under [`OverflowPolicy::Block`]
    /// while the queue is full.
    pub fn log(&self, draft: EventDraft) -> Result<TraceId> {
        if let Err(e) = self.validate(&draft) {
            self.shared.metrics.record_rejected();
            return Err(e);
        }

        let event = Event::new(draft);
        let trace_id = event.trace_id();

        match self.shared.queue.push(event) {
            Ok(Pushed::Queued) => {
                self.shared.metrics.record_accepted();
                Ok(trace_id)
            }
            Ok(Pushed::Evicted(evicted)) => {
                self.shared.metrics.record_accepted();
                self.shared.metrics.record_dropped();
                tracing::warn!(
                    evicted = %evicted.trace_id(),
                    category = evicted.category().as_str(),
                    "event queue full, dropped oldest event"
                );
                Ok(trace_id)
            }
            Err(e @ LogError::QueueFull { .. })
                if self.config.overflow == OverflowPolicy::DropNewest =>
            {
                self.shared.metrics.record_dropped();
                tracing::warn!(trace_id = %trace_id, "event queue full, dropped newest event");
                Err(e)
            }
            Err(e) => {
                self.shared.metrics.record_rejected();
                Err(e)
            }
        }
    }

    fn validate(&self, draft: &EventDraft) -> Result<()> {
        // Applies in every mode: the store must stay exportable.
        if let Some(key) = draft
            .metadata()
            .iter()
            .find_map(|(key, value)| (!value.is_finite()).then_some(key))
        {
            return Err(LogError::invalid_event(format!(
                "metadata '{key}' holds a non-finite number"
            )));
        }
        if self.config.validation == ValidationMode::Permissive {
            return Ok(());
        }
        if !draft.category().is_known() {
            return Err(LogError::invalid_event(format!(
                "unknown category '{}'",
                draft.category()
            )));
        }
        if !draft.severity().is_known() {
            return Err(LogError::invalid_event(format!(
                "unknown severity '{}'",
                draft.severity()
            )));
        }
        if draft.module().trim().is_empty() {
            return Err(LogError::invalid_event("module must not be empty"));
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Read path
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns stored events of one category, oldest first.
    #[must_use]
    pub fn events_by_category(&self, category: &Category) -> Vec<Event> {
        self.filter(|e| e.category() == category)
    }

    /// Returns stored events of one severity, oldest first.
    #[must_use]
    pub fn events_by_severity(&self, severity: &Severity) -> Vec<Event> {
        self.filter(|e| e.severity() == severity)
    }

    /// Returns a snapshot of the whole store.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.shared.store.read().clone()
    }

    /// Runs `f` over the store under a single shared lock.
    ///
    /// Use this when several figures must come from the same instant.
    pub fn inspect<R>(&self, f: impl FnOnce(&[Event]) -> R) -> R {
        f(&self.shared.store.read())
    }

    fn filter(&self, predicate: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.shared
            .store
            .read()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.store.read().len()
    }

    /// Returns true if nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.store.read().is_empty()
    }

    /// Serializes the whole store as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `LogError::Serialization` if an event cannot be represented.
    pub fn export_json(&self) -> Result<String> {
        export::to_json(&self.shared.store.read())
    }

    /// Subscribes to events as they are stored.
    ///
    /// Only events stored after this call are delivered. A receiver that
    /// falls behind by more than `subscriber_capacity` events skips ahead;
    /// the store itself is unaffected.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.live.subscribe()
    }

    /// Returns the pipeline counters.
    #[must_use]
    pub fn stats(&self) -> LoggerStats {
        self.shared.metrics.snapshot(self.shared.queue.len())
    }

    /// Queue capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════════

    /// Waits until every event accepted so far has been stored.
    ///
    /// # Errors
    /// Returns `LogError::Timeout` if the queue does not drain in time.
    pub fn flush(&self, timeout: Duration) -> Result<()> {
        self.shared.queue.wait_drained(timeout)
    }

    /// Returns true once shutdown has begun.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.queue.is_closed()
    }

    /// Stops accepting events, drains the queue and joins the consumer.
    ///
    /// Producers blocked on a full queue wake with `LogError::Closed`.
    /// Calling this more than once, or from several threads at once, is
    /// harmless: no call returns before the queue has been drained.
    ///
    /// # Errors
    /// Returns `LogError::Consumer` if the consumer thread panicked, or if
    /// called from inside a sink (the consumer cannot join itself).
    pub fn shutdown(&self) -> Result<()> {
        if std::thread::current().id() == self.consumer_id {
            return Err(LogError::consumer(
                "shutdown called from the consumer thread",
            ));
        }

        if self.shared.queue.close() {
            tracing::debug!(pending = self.shared.queue.len(), "event logger closing");
        }

        let mut consumer = self.consumer.lock();
        let Some(handle) = consumer.take() else {
            return Ok(());
        };

        handle
            .join()
            .map_err(|_| LogError::consumer("consumer thread panicked"))?;
        drop(consumer);

        tracing::info!(stored = self.len(), "event logger shut down");
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "event logger shutdown failed during drop");
        }
    }
}

/// Consumer loop: the only writer to the store.
fn run_consumer(shared: &Shared) {
    tracing::debug!("event consumer started");
    let mut consumed: u64 = 0;

    while let Some(event) = shared.queue.pop() {
        shared.store.write().push(event.clone());
        shared.metrics.record_stored();
        consumed += 1;

        // A faulty sink must not stop ingestion.
        if catch_unwind(AssertUnwindSafe(|| shared.sink.emit(&event))).is_err() {
            shared.metrics.record_sink_panic();
            tracing::error!(
                trace_id = %event.trace_id(),
                "event sink panicked; event kept in store"
            );
        }

        // No receivers is not an error.
        let _ = shared.live.send(event);
        shared.queue.complete();
    }

    tracing::debug!(consumed, "event consumer stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::event::MetaValue;
    use crate::sink::{MemorySink, NullSink};

    const WAIT: Duration = Duration::from_secs(5);

    fn quiet_logger(config: LoggerConfig) -> EventLogger {
        EventLogger::with_sink(config, Arc::new(NullSink)).unwrap()
    }

    fn audit(message: &str) -> EventDraft {
        EventDraft::new(Category::Audit, "test", Severity::Info, message)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = EventLogger::new(0).unwrap_err();
        assert!(matches!(err, LogError::Config(_)));
    }

    #[test]
    fn test_log_and_flush() {
        let logger = quiet_logger(LoggerConfig::new(8));
        assert!(logger.is_empty());

        let id = logger.log(audit("System started")).unwrap();
        logger.flush(WAIT).unwrap();

        let events = logger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].trace_id(), id);
        assert_eq!(events[0].message(), "System started");
    }

    #[test]
    fn test_log_event_with_metadata() {
        let logger = quiet_logger(LoggerConfig::new(8));
        let mut metadata = Metadata::new();
        metadata.insert("drift_value".into(), MetaValue::from(0.05));
        logger
            .log_event(
                Category::SensorError,
                "sensor_fusion",
                Severity::Warn,
                "IMU calibration drift detected",
                metadata,
            )
            .unwrap();
        logger.flush(WAIT).unwrap();

        let found = logger.events_by_category(&Category::SensorError);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].metadata()["drift_value"], MetaValue::Float(0.05));
    }

    #[test]
    fn test_filters_preserve_store_order() {
        let logger = quiet_logger(LoggerConfig::new(16));
        for i in 0..6 {
            let (category, severity) = if i % 2 == 0 {
                (Category::ControlError, Severity::Error)
            } else {
                (Category::Audit, Severity::Info)
            };
            logger
                .log(EventDraft::new(category, "ctl", severity, format!("e{i}")))
                .unwrap();
        }
        logger.flush(WAIT).unwrap();

        let errors: Vec<_> = logger
            .events_by_severity(&Severity::Error)
            .iter()
            .map(|e| e.message().to_string())
            .collect();
        assert_eq!(errors, ["e0", "e2", "e4"]);
        assert!(logger.events_by_category(&Category::SystemError).is_empty());
        assert!(logger.events_by_severity(&Severity::Critical).is_empty());
    }

    #[test]
    fn test_strict_rejects_unknown_labels() {
        let logger = quiet_logger(LoggerConfig::new(4));
        let err = logger
            .log_event_str("audit", "m", "DEBUG", "x", Metadata::new())
            .unwrap_err();
        assert!(matches!(err, LogError::InvalidEvent(_)));
        assert!(err.to_string().contains("DEBUG"));

        let err = logger
            .log_event_str("telemetry", "m", "INFO", "x", Metadata::new())
            .unwrap_err();
        assert!(err.to_string().contains("telemetry"));

        let err = logger.log(EventDraft::new(Category::Audit, " ", Severity::Info, "x"));
        assert!(err.is_err());

        logger.flush(WAIT).unwrap();
        assert!(logger.is_empty());
        assert_eq!(logger.stats().rejected, 3);
    }

    #[test]
    fn test_permissive_accepts_unknown_labels() {
        let logger = quiet_logger(
            LoggerConfig::new(4).with_validation(ValidationMode::Permissive),
        );
        logger
            .log_event_str("telemetry", "m", "debug", "x", Metadata::new())
            .unwrap();
        logger.flush(WAIT).unwrap();

        let events = logger.events_by_severity(&Severity::Other("debug".into()));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category().as_str(), "telemetry");
    }

    #[test]
    fn test_permissive_keeps_labels_verbatim() {
        let sink = Arc::new(MemorySink::new());
        let logger = EventLogger::with_sink(
            LoggerConfig::new(4).with_validation(ValidationMode::Permissive),
            Arc::clone(&sink) as Arc<dyn EventSink>,
        )
        .unwrap();
        logger
            .log_event_str("audit", "m", "info", "x", Metadata::new())
            .unwrap();
        logger.flush(WAIT).unwrap();

        let events = logger.events();
        assert_eq!(events[0].category(), &Category::Audit);
        assert_eq!(events[0].severity(), &Severity::Other("info".into()));
        assert!(sink.lines()[0].starts_with(" [audit] m/info: x"));

        let back = export::from_json(&logger.export_json().unwrap()).unwrap();
        assert_eq!(back, events);
    }

    #[test]
    fn test_capacity_reports_buffer_size() {
        let logger = quiet_logger(LoggerConfig::new(7));
        assert_eq!(logger.capacity(), 7);
    }

    #[test]
    fn test_string_labels_case_insensitive() {
        let logger = quiet_logger(LoggerConfig::new(4));
        logger
            .log_event_str("Safety_Violation", "m", "critical", "x", Metadata::new())
            .unwrap();
        logger.flush(WAIT).unwrap();
        assert_eq!(logger.events_by_severity(&Severity::Critical).len(), 1);
    }

    #[test]
    fn test_shutdown_drains_and_closes() {
        let logger = quiet_logger(LoggerConfig::new(64));
        for i in 0..50 {
            logger.log(audit(&format!("e{i}"))).unwrap();
        }
        logger.shutdown().unwrap();
        assert_eq!(logger.len(), 50);
        assert!(logger.is_closed());

        let err = logger.log(audit("late")).unwrap_err();
        assert!(matches!(err, LogError::Closed));
        assert!(logger.shutdown().is_ok());
    }

    #[test]
    fn test_sink_receives_every_event() {
        let sink = Arc::new(MemorySink::new());
        let logger =
            EventLogger::with_sink(LoggerConfig::new(4), Arc::clone(&sink) as Arc<dyn EventSink>)
                .unwrap();
        logger.log(audit("one")).unwrap();
        logger
            .log(EventDraft::new(
                Category::SafetyViolation,
                "safety_monitor",
                Severity::Critical,
                "two",
            ))
            .unwrap();
        logger.flush(WAIT).unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ℹ️ [audit] test/INFO: one (TraceID: "));
        assert!(lines[1].starts_with("🚨 [safety_violation] safety_monitor/CRITICAL: two"));
    }

    struct PanickingSink {
        calls: AtomicUsize,
    }

    impl EventSink for PanickingSink {
        fn emit(&self, event: &Event) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(event.message() != "boom", "sink failure");
        }
    }

    #[test]
    fn test_sink_panic_does_not_stop_pipeline() {
        let sink = Arc::new(PanickingSink {
            calls: AtomicUsize::new(0),
        });
        let logger =
            EventLogger::with_sink(LoggerConfig::new(4), Arc::clone(&sink) as Arc<dyn EventSink>)
                .unwrap();
        logger.log(audit("before")).unwrap();
        logger.log(audit("boom")).unwrap();
        logger.log(audit("after")).unwrap();
        logger.flush(WAIT).unwrap();

        assert_eq!(logger.len(), 3);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
        assert_eq!(logger.stats().sink_panics, 1);
    }

    #[test]
    fn test_drop_oldest_counts_drops() {
        // Sink that holds the consumer so the queue fills up.
        struct Gate(Mutex<()>);
        impl EventSink for Gate {
            fn emit(&self, _event: &Event) {
                drop(self.0.lock());
            }
        }

        let gate = Arc::new(Gate(Mutex::new(())));
        let held = gate.0.lock();
        let logger = EventLogger::with_sink(
            LoggerConfig::new(2).with_overflow(OverflowPolicy::DropOldest),
            Arc::clone(&gate) as Arc<dyn EventSink>,
        )
        .unwrap();

        // First event is taken by the consumer and parks in the sink.
        logger.log(audit("first")).unwrap();
        while logger.stats().queue_depth > 0 || logger.is_empty() {
            std::thread::yield_now();
        }
        for m in ["a", "b", "c", "d"] {
            logger.log(audit(m)).unwrap();
        }
        drop(held);
        logger.flush(WAIT).unwrap();

        let messages: Vec<_> = logger
            .events()
            .iter()
            .map(|e| e.message().to_string())
            .collect();
        assert_eq!(messages, ["first", "c", "d"]);
        let stats = logger.stats();
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.accepted, 5);
        assert_eq!(stats.stored, 3);
    }

    #[test]
    fn test_export_json_round_trip() {
        let logger = quiet_logger(LoggerConfig::new(8));
        logger.log(audit("System started")).unwrap();
        logger
            .log(
                EventDraft::new(
                    Category::SafetyViolation,
                    "safety_monitor",
                    Severity::Critical,
                    "Velocity exceeded: 35.00 > 30.00",
                )
                .with_metadata("current_velocity", 35.0),
            )
            .unwrap();
        logger.flush(WAIT).unwrap();

        let json = logger.export_json().unwrap();
        let back = export::from_json(&json).unwrap();
        assert_eq!(back, logger.events());
    }

    #[test]
    fn test_inspect_consistent_view() {
        let logger = quiet_logger(LoggerConfig::new(8));
        logger.log(audit("a")).unwrap();
        logger.log(audit("b")).unwrap();
        logger.flush(WAIT).unwrap();
        let (len, last) = logger.inspect(|events| {
            (events.len(), events.last().map(|e| e.message().to_string()))
        });
        assert_eq!(len, 2);
        assert_eq!(last.as_deref(), Some("b"));
    }

    #[test]
    fn test_debug_format() {
        let logger = quiet_logger(LoggerConfig::new(2));
        let text = format!("{logger:?}");
        assert!(text.contains("EventLogger"));
        assert!(text.contains("buffer_size: 2"));
    }
}
