// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # aegis-safety
//!
//! Safety monitoring on top of the aegis event logger.
//!
//! This crate provides:
//! - **Limit checks**: altitude and velocity thresholds that log CRITICAL
//!   `safety_violation` events when exceeded
//! - **Envelopes**: a configurable set of limits checked per telemetry sample
//! - **Reports**: violation and sensor-error counts with the most recent
//!   violations
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aegis_events::EventLogger;
//! use aegis_safety::SafetyMonitor;
//!
//! let logger = Arc::new(EventLogger::new(100)?);
//! let monitor = SafetyMonitor::new(Arc::clone(&logger));
//!
//! if !monitor.check_altitude_limit(150.0, 100.0) {
//!     // violation already logged
//! }
//! println!("{}", monitor.generate_safety_report());
//! # Ok::<(), aegis_events::LogError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod monitor;
pub mod report;

pub use config::AegisConfig;
pub use envelope::{EnvelopeVerdict, Limit, SafetyEnvelope, Telemetry};
pub use error::{Result, SafetyError};
pub use monitor::{MONITOR_MODULE, SafetyMonitor};
pub use report::{RECENT_VIOLATIONS, ReportLine, SafetyReport};
