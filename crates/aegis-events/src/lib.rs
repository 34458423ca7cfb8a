// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # aegis-events
//!
//! In-process event pipeline for safety-critical control software.
//!
//! This crate provides:
//! - **Event model**: closed categories and severities, structured metadata,
//!   random trace IDs
//! - **Bounded queue**: configurable overflow policy (block, drop oldest,
//!   drop newest, fail fast)
//! - **Background consumer**: single writer into an append-only store,
//!   guarded against faulty sinks
//! - **Queries and export**: category/severity filters, pretty JSON export,
//!   live subscription
//! - **Lifecycle**: flush with timeout, shutdown that drains before joining
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use aegis_events::{Category, EventDraft, EventLogger, Severity};
//!
//! let logger = EventLogger::new(100)?;
//! logger.log(
//!     EventDraft::new(Category::SensorError, "sensor_fusion", Severity::Warn, "IMU drift")
//!         .with_metadata("drift_value", 0.05),
//! )?;
//! logger.flush(Duration::from_secs(1))?;
//! println!("{}", logger.export_json()?);
//! logger.shutdown()?;
//! # Ok::<(), aegis_events::LogError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod logger;
pub mod metrics;
mod queue;
pub mod sink;

pub use config::{LoggerConfig, OverflowPolicy, ValidationMode};
pub use error::{LogError, Result};
pub use event::{Category, Event, EventDraft, MetaValue, Metadata, Severity, TraceId};
pub use logger::EventLogger;
pub use metrics::LoggerStats;
pub use sink::{EventSink, MemorySink, NullSink, TracingSink, format_line};
