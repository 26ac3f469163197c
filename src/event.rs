use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form payload attached to an [`ActivityRecord`].
///
/// Keys keep their insertion order, so a rendered record lists tracker
/// defaults first and caller-supplied keys after them.
pub type Details = Map<String, Value>;

/// One logged activity.
///
/// Records serialize with the same field names a browser consumer would see
/// (`eventType`, `details`, `timestamp`).
///
/// # Examples
///
/// ```
/// use activity_tracker::ActivityRecord;
/// use serde_json::json;
///
/// let record = ActivityRecord::new("click", json!({"x": 10}).as_object().unwrap().clone());
/// assert_eq!(record.event_type, "click");
/// assert_eq!(record.details["x"], 10);
/// assert!(record.timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ActivityRecord {
    /// Kind of activity (`"click"`, `"page_view"`, or anything a caller logs).
    pub event_type: String,

    /// Payload, stored exactly as given.
    pub details: Details,

    /// Capture instant as an RFC 3339 UTC string with millisecond precision.
    pub timestamp: String,
}

impl ActivityRecord {
    /// Create a record stamped with the current time.
    pub fn new(event_type: &str, details: Details) -> Self {
        Self::at(event_type, details, Utc::now())
    }

    pub(crate) fn at(event_type: &str, details: Details, at: DateTime<Utc>) -> Self {
        ActivityRecord {
            event_type: event_type.to_string(),
            details,
            timestamp: iso_timestamp(at),
        }
    }

    /// Parse the timestamp back into an instant.
    ///
    /// Returns `None` only for records built by hand with a malformed
    /// timestamp; records produced by the log always parse.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Format an instant the way records carry it: `2026-10-18T09:30:00.123Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Conversion into a [`Details`] payload.
///
/// Trackers accept either a ready-made map or any JSON value. An object is
/// used as-is and `null` means "no details". Any other value has no keys to
/// contribute, so it is dropped with a warning.
pub trait IntoDetails {
    fn into_details(self) -> Details;
}

impl IntoDetails for Details {
    fn into_details(self) -> Details {
        self
    }
}

impl IntoDetails for Value {
    fn into_details(self) -> Details {
        match self {
            Value::Object(map) => map,
            Value::Null => Details::new(),
            other => {
                log::warn!("activity-tracker: ignoring non-object details: {other}");
                Details::new()
            }
        }
    }
}

impl IntoDetails for () {
    fn into_details(self) -> Details {
        Details::new()
    }
}

impl<K: Into<String>, V: Into<Value>> IntoDetails for Vec<(K, V)> {
    fn into_details(self) -> Details {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}
