//! JSON export of the event store.

use crate::error::Result;
use crate::event::Event;

/// Serializes events as a pretty-printed JSON array (2-space indent).
///
/// # Errors
/// Returns `LogError::Serialization` if an event cannot be represented.
pub fn to_json(events: &[Event]) -> Result<String> {
    Ok(serde_json::to_string_pretty(events)?)
}

/// Parses the output of [`to_json`] back into events.
///
/// # Errors
/// Returns `LogError::Serialization` if the text is not a valid export.
pub fn from_json(json: &str) -> Result<Vec<Event>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Category, EventDraft, MetaValue, Severity, TraceId};

    #[test]
    fn test_empty_export() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
        assert!(from_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_export_layout() {
        let event = Event::new(
            EventDraft::new(
                Category::SensorError,
                "sensor_fusion",
                Severity::Warn,
                "IMU calibration drift detected",
            )
            .with_metadata("drift_value", 0.05),
        );
        let json = to_json(std::slice::from_ref(&event)).unwrap();
        assert!(json.starts_with("[\n  {\n    \"timestamp\": "));
        assert!(json.contains("\"category\": \"sensor_error\""));
        assert!(json.contains("\"severity\": \"WARN\""));
        assert!(json.contains("\"drift_value\": 0.05"));
        assert!(json.contains("\"parent_id\": null"));
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let parent = TraceId::new();
        let events = vec![
            Event::new(EventDraft::new(
                Category::Audit,
                "flight_controller",
                Severity::Info,
                "System started",
            )),
            Event::new(
                EventDraft::new(
                    Category::SafetyViolation,
                    "safety_monitor",
                    Severity::Critical,
                    "Altitude exceeded: 150.00 > 100.00",
                )
                .with_metadata("current_altitude", 150.0)
                .with_metadata("max_altitude", 100.0)
                .with_metadata("tags", vec!["altitude", "envelope"])
                .with_metadata("retries", 0_i32)
                .caused_by(parent),
            ),
        ];

        let back = from_json(&to_json(&events).unwrap()).unwrap();
        assert_eq!(back, events);
        assert_eq!(
            back[1].metadata()["current_altitude"],
            MetaValue::Float(150.0)
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(from_json("{\"not\": \"an array\"}").is_err());
    }
}
