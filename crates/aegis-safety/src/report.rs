//! Safety report.
//!
//! Built from a single consistent view of the store, so the counts and the
//! recent-violation list always agree with each other.

use std::fmt;

use aegis_events::{Category, Event, TraceId};
use chrono::{DateTime, Utc};

/// How many recent violations a report lists.
pub const RECENT_VIOLATIONS: usize = 5;

const BANNER_WIDTH: usize = 40;

/// One line of the recent-violation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// When the violation was logged.
    pub timestamp: DateTime<Utc>,
    /// Violation message.
    pub message: String,
    /// Trace ID of the violation event.
    pub trace_id: TraceId,
}

/// Summary of safety-relevant events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafetyReport {
    /// Number of `safety_violation` events.
    pub violations: usize,
    /// Number of `sensor_error` events.
    pub sensor_errors: usize,
    /// Number of events in the store.
    pub total_events: usize,
    /// The last `min(5, violations)` violations, oldest first.
    pub recent: Vec<ReportLine>,
}

impl SafetyReport {
    /// Builds a report from the store contents.
    #[must_use]
    pub fn from_events(events: &[Event]) -> Self {
        let violations: Vec<&Event> = events
            .iter()
            .filter(|e| *e.category() == Category::SafetyViolation)
            .collect();
        let sensor_errors = events
            .iter()
            .filter(|e| *e.category() == Category::SensorError)
            .count();

        let skip = violations.len().saturating_sub(RECENT_VIOLATIONS);
        let recent = violations[skip..]
            .iter()
            .map(|e| ReportLine {
                timestamp: e.timestamp(),
                message: e.message().to_string(),
                trace_id: e.trace_id(),
            })
            .collect();

        Self {
            violations: violations.len(),
            sensor_errors,
            total_events: events.len(),
            recent,
        }
    }
}

/// Renders the boxed banner, the counts and one `  • HH:MM:SS: message`
/// line per recent violation. Times of day are UTC.
impl fmt::Display for SafetyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "═".repeat(BANNER_WIDTH);
        writeln!(f)?;
        writeln!(f, "╔{rule}╗")?;
        writeln!(
            f,
            "║{:^width$}║",
            "Safety Monitor Report",
            width = BANNER_WIDTH
        )?;
        writeln!(f, "╚{rule}╝")?;
        writeln!(f)?;
        writeln!(f, "Safety violations: {}", self.violations)?;
        writeln!(f, "Sensor errors: {}", self.sensor_errors)?;
        writeln!(f, "Total events: {}", self.total_events)?;
        writeln!(f)?;
        writeln!(f, "Recent safety violations:")?;
        for line in &self.recent {
            writeln!(
                f,
                "  • {}: {}",
                line.timestamp.format("%H:%M:%S"),
                line.message
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_events::{EventDraft, Severity};

    fn event(category: Category, message: &str) -> Event {
        Event::new(EventDraft::new(category, "test", Severity::Critical, message))
    }

    #[test]
    fn test_empty_report() {
        let report = SafetyReport::from_events(&[]);
        assert_eq!(report, SafetyReport::default());
        let text = report.to_string();
        assert!(text.contains("Safety violations: 0"));
        assert!(text.contains("Sensor errors: 0"));
        assert!(text.contains("Total events: 0"));
        assert!(!text.contains("  • "));
    }

    #[test]
    fn test_counts() {
        let events = vec![
            event(Category::Audit, "System started"),
            event(Category::SensorError, "drift"),
            event(Category::SafetyViolation, "Altitude exceeded: 150.00 > 100.00"),
            event(Category::ControlError, "actuator"),
        ];
        let report = SafetyReport::from_events(&events);
        assert_eq!(report.violations, 1);
        assert_eq!(report.sensor_errors, 1);
        assert_eq!(report.total_events, 4);
        assert_eq!(report.recent.len(), 1);
        assert_eq!(report.recent[0].trace_id, events[2].trace_id());
    }

    #[test]
    fn test_recent_keeps_last_five_in_store_order() {
        let events: Vec<_> = (0..8)
            .map(|i| event(Category::SafetyViolation, &format!("v{i}")))
            .collect();
        let report = SafetyReport::from_events(&events);
        assert_eq!(report.violations, 8);
        let messages: Vec<_> = report.recent.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, ["v3", "v4", "v5", "v6", "v7"]);
    }

    #[test]
    fn test_layout() {
        let events = vec![event(
            Category::SafetyViolation,
            "Altitude exceeded: 150.00 > 100.00",
        )];
        let text = SafetyReport::from_events(&events).to_string();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], format!("╔{}╗", "═".repeat(40)));
        assert_eq!(lines[2].chars().count(), 42);
        assert!(lines[2].contains("Safety Monitor Report"));
        assert_eq!(lines[5], "Safety violations: 1");
        assert_eq!(lines[6], "Sensor errors: 0");
        assert_eq!(lines[7], "Total events: 1");
        assert_eq!(lines[9], "Recent safety violations:");

        let expected = format!(
            "  • {}: Altitude exceeded: 150.00 > 100.00",
            events[0].timestamp().format("%H:%M:%S")
        );
        assert_eq!(lines[10], expected);
    }
}
