//! Threshold checks that turn telemetry into safety violation events.
//!
//! The monitor holds no state of its own. Limits arrive with each call and
//! every finding goes straight into the shared [`EventLogger`].

use std::sync::Arc;

use aegis_events::{Category, EventDraft, EventLogger, MetaValue, Severity};

use crate::envelope::{EnvelopeVerdict, Limit, SafetyEnvelope, Telemetry};
use crate::report::SafetyReport;

/// Module name recorded on every violation event.
pub const MONITOR_MODULE: &str = "safety_monitor";

/// Stateless safety monitor bound to one event logger.
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    logger: Arc<EventLogger>,
}

impl SafetyMonitor {
    /// Creates a monitor that reports into `logger`.
    #[must_use]
    pub const fn new(logger: Arc<EventLogger>) -> Self {
        Self { logger }
    }

    /// Returns the logger this monitor reports into.
    #[must_use]
    pub const fn logger(&self) -> &Arc<EventLogger> {
        &self.logger
    }

    /// Returns true iff `altitude <= max_altitude`.
    ///
    /// A violation is logged as one CRITICAL `safety_violation` event.
    pub fn check_altitude_limit(&self, altitude: f64, max_altitude: f64) -> bool {
        self.check_limit(Limit::Altitude, altitude, max_altitude)
    }

    /// Returns true iff `velocity <= max_velocity`.
    ///
    /// A violation is logged as one CRITICAL `safety_violation` event.
    pub fn check_velocity_limit(&self, velocity: f64, max_velocity: f64) -> bool {
        self.check_limit(Limit::Velocity, velocity, max_velocity)
    }

    /// Checks one sample against every limit of an envelope.
    pub fn check_envelope(
        &self,
        telemetry: &Telemetry,
        envelope: &SafetyEnvelope,
    ) -> EnvelopeVerdict {
        let breaches = [Limit::Altitude, Limit::Velocity]
            .into_iter()
            .filter(|&limit| !self.check_limit(limit, telemetry.value(limit), envelope.max(limit)))
            .collect();
        EnvelopeVerdict { breaches }
    }

    // NaN never satisfies `<=`, so unreadable telemetry counts as a violation.
    fn check_limit(&self, limit: Limit, value: f64, max: f64) -> bool {
        if value <= max {
            return true;
        }

        let draft = EventDraft::new(
            Category::SafetyViolation,
            MONITOR_MODULE,
            Severity::Critical,
            format!("{} exceeded: {value:.2} > {max:.2}", limit.label()),
        )
        .with_metadata(limit.current_key(), reading(value))
        .with_metadata(limit.max_key(), reading(max));

        if let Err(e) = self.logger.log(draft) {
            tracing::error!(
                limit = %limit,
                value,
                max,
                error = %e,
                "failed to log safety violation"
            );
        }
        false
    }

    /// Summarises violations and sensor errors from one view of the store.
    #[must_use]
    pub fn safety_report(&self) -> SafetyReport {
        self.logger.inspect(SafetyReport::from_events)
    }

    /// Renders [`SafetyMonitor::safety_report`] as text.
    #[must_use]
    pub fn generate_safety_report(&self) -> String {
        self.safety_report().to_string()
    }
}

/// JSON cannot carry NaN or infinity, so those readings are kept as text.
fn reading(value: f64) -> MetaValue {
    if value.is_finite() {
        MetaValue::Float(value)
    } else {
        MetaValue::Str(value.to_string())
    }
}
