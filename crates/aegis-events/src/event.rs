//! Event data model.
//!
//! An [`Event`] is immutable once created: the logger stamps the time and
//! trace ID, and the store only ever appends.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Category
// =============================================================================

/// Classification of where an event came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Category {
    /// Sensor fault or calibration problem.
    SensorError,
    /// Control loop failure.
    ControlError,
    /// Operational limit exceeded.
    SafetyViolation,
    /// Platform or runtime failure.
    SystemError,
    /// Audit trail notice.
    Audit,
    /// Unrecognised label, only accepted in permissive mode.
    Other(String),
}

impl Category {
    /// All known categories, in declaration order.
    pub const KNOWN: [Self; 5] = [
        Self::SensorError,
        Self::ControlError,
        Self::SafetyViolation,
        Self::SystemError,
        Self::Audit,
    ];

    /// Parses a label case-insensitively. Unknown labels become [`Category::Other`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        Self::known(&label.trim().to_ascii_lowercase())
            .unwrap_or_else(|| Self::Other(label.to_string()))
    }

    /// Parses a label verbatim: only the exact wire label is recognised.
    #[must_use]
    pub fn parse_exact(label: &str) -> Self {
        Self::known(label).unwrap_or_else(|| Self::Other(label.to_string()))
    }

    fn known(label: &str) -> Option<Self> {
        Some(match label {
            "sensor_error" => Self::SensorError,
            "control_error" => Self::ControlError,
            "safety_violation" => Self::SafetyViolation,
            "system_error" => Self::SystemError,
            "audit" => Self::Audit,
            _ => return None,
        })
    }

    /// Returns the wire label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SensorError => "sensor_error",
            Self::ControlError => "control_error",
            Self::SafetyViolation => "safety_violation",
            Self::SystemError => "system_error",
            Self::Audit => "audit",
            Self::Other(label) => label,
        }
    }

    /// Returns true for the closed set of categories.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self::parse_exact(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Urgency of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Severity {
    /// Informational.
    Info,
    /// Degraded but operating.
    Warn,
    /// Failure requiring attention.
    Error,
    /// Failure threatening safety.
    Critical,
    /// Unrecognised label, only accepted in permissive mode.
    Other(String),
}

impl Severity {
    /// All known severities, least urgent first.
    pub const KNOWN: [Self; 4] = [Self::Info, Self::Warn, Self::Error, Self::Critical];

    /// Parses a label case-insensitively. Unknown labels become [`Severity::Other`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        Self::known(&label.trim().to_ascii_uppercase())
            .unwrap_or_else(|| Self::Other(label.to_string()))
    }

    /// Parses a label verbatim: only the exact wire label is recognised.
    #[must_use]
    pub fn parse_exact(label: &str) -> Self {
        Self::known(label).unwrap_or_else(|| Self::Other(label.to_string()))
    }

    fn known(label: &str) -> Option<Self> {
        Some(match label {
            "INFO" => Self::Info,
            "WARN" => Self::Warn,
            "ERROR" => Self::Error,
            "CRITICAL" => Self::Critical,
            _ => return None,
        })
    }

    /// Returns the wire label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Other(label) => label,
        }
    }

    /// Diagnostic icon. Unknown severities have none.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ️",
            Self::Warn => "⚠️",
            Self::Error => "❌",
            Self::Critical => "🚨",
            Self::Other(_) => "",
        }
    }

    /// Returns true for the closed set of severities.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        Self::parse_exact(&label)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Structured context attached to an event.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A metadata value.
///
/// Serialized untagged, so `{"drift_value": 0.05}` reads back as
/// [`MetaValue::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number. Must be finite to be logged or exported.
    #[serde(serialize_with = "serialize_finite")]
    Float(f64),
    /// Text.
    Str(String),
    /// Ordered sequence.
    List(Vec<MetaValue>),
    /// Nested mapping.
    Map(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    /// Returns the numeric value for `Int` and `Float`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns false if this value or anything nested in it is a NaN or
    /// infinite float.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(v) => v.is_finite(),
            Self::List(items) => items.iter().all(Self::is_finite),
            Self::Map(entries) => entries.values().all(Self::is_finite),
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Str(_) => true,
        }
    }

    /// Returns the text for `Str`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

// JSON has no NaN or infinity; serde_json would silently write `null`.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_finite<S: serde::Serializer>(
    value: &f64,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        Err(serde::ser::Error::custom(format!(
            "non-finite float {value} cannot be serialized"
        )))
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for MetaValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for MetaValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for MetaValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for MetaValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Metadata> for MetaValue {
    fn from(v: Metadata) -> Self {
        Self::Map(v)
    }
}

// =============================================================================
// TraceId
// =============================================================================

/// Correlation identifier assigned to every event.
///
/// Random v4 UUIDs, so two events logged in the same nanosecond still get
/// distinct IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(uuid::Uuid);

impl TraceId {
    /// Generates a new random trace ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a trace ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// EventDraft
// =============================================================================

/// Producer-side description of an event, before it is stamped.
#[derive(Debug, Clone)]
pub struct EventDraft {
    category: Category,
    module: String,
    severity: Severity,
    message: String,
    metadata: Metadata,
    parent_id: Option<TraceId>,
}

impl EventDraft {
    /// Creates a draft with empty metadata.
    #[must_use]
    pub fn new(
        category: Category,
        module: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            module: module.into(),
            severity,
            message: message.into(),
            metadata: Metadata::new(),
            parent_id: None,
        }
    }

    /// Adds one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merges a metadata map into the draft.
    #[must_use]
    pub fn with_metadata_map(mut self, metadata: Metadata) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Links the event to the event that caused it.
    #[must_use]
    pub const fn caused_by(mut self, parent: TraceId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    /// Returns the producing module.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the severity.
    #[must_use]
    pub const fn severity(&self) -> &Severity {
        &self.severity
    }

    /// Returns the metadata gathered so far.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

// =============================================================================
// Event
// =============================================================================

/// An immutable record of something that happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    timestamp: DateTime<Utc>,
    category: Category,
    module: String,
    severity: Severity,
    message: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
    trace_id: TraceId,
    #[serde(default)]
    parent_id: Option<TraceId>,
}

impl Event {
    /// Stamps a draft with the current time and a fresh trace ID.
    #[must_use]
    pub fn new(draft: EventDraft) -> Self {
        Self {
            timestamp: Utc::now(),
            category: draft.category,
            module: draft.module,
            severity: draft.severity,
            message: draft.message,
            metadata: draft.metadata,
            trace_id: TraceId::new(),
            parent_id: draft.parent_id,
        }
    }

    /// Creation time.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Event category.
    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    /// Producing module.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Event severity.
    #[must_use]
    pub const fn severity(&self) -> &Severity {
        &self.severity
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured context; empty when none was given.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Correlation ID.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Causing event, if any.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TraceId> {
        self.parent_id
    }
}
