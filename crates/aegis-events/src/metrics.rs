//! Pipeline counters.
//!
//! Lock-free counters updated by producers and the consumer, read as a
//! [`LoggerStats`] snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters shared by the producer path and the consumer thread.
#[derive(Debug, Default)]
pub(crate) struct LoggerMetrics {
    accepted: AtomicU64,
    stored: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
    sink_panics: AtomicU64,
}

impl LoggerMetrics {
    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sink_panic(&self) {
        self.sink_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, queue_depth: usize) -> LoggerStats {
        LoggerStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            sink_panics: self.sink_panics.load(Ordering::Relaxed),
            queue_depth,
        }
    }
}

/// Point-in-time view of the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoggerStats {
    /// Events accepted into the queue.
    pub accepted: u64,
    /// Events appended to the store.
    pub stored: u64,
    /// Events lost to `drop_oldest` eviction or `drop_newest` discard.
    pub dropped: u64,
    /// Events refused with an error (validation, fail-fast, timeout, closed).
    pub rejected: u64,
    /// Sink invocations that panicked.
    pub sink_panics: u64,
    /// Events waiting in the queue.
    pub queue_depth: usize,
}
