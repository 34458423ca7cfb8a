//! Aegis: in-process event observability for safety-critical control systems.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aegis::prelude::*;
//!
//! let logger = Arc::new(EventLogger::new(100)?);
//! let monitor = SafetyMonitor::new(Arc::clone(&logger));
//! monitor.check_altitude_limit(150.0, 100.0);
//! logger.shutdown()?;
//! println!("{}", logger.export_json()?);
//! # Ok::<(), aegis::events::LogError>(())
//! ```

pub use aegis_events as events;
pub use aegis_safety as safety;

/// Prelude module for common imports.
pub mod prelude {
    pub use aegis_events::{
        Category, Event, EventDraft, EventLogger, LogError, LoggerConfig, MetaValue, Metadata,
        OverflowPolicy, Severity, TraceId, ValidationMode,
    };
    pub use aegis_safety::{AegisConfig, SafetyEnvelope, SafetyMonitor, SafetyReport, Telemetry};
}
