use crate::domain::model::{AlarmLabels, AlarmMetadata, CanonicalEvent};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%d.%m.%Y %H:%M:%S"];

/// Parse a vendor timestamp into nanoseconds since the epoch.
///
/// Timestamps without an offset are taken as UTC.
pub fn parse_timestamp_ns(timestamp: &str) -> Option<i64> {
    let ts = timestamp.trim();
    if ts.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.timestamp_nanos_opt();
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .and_then(|naive| naive.and_utc().timestamp_nanos_opt())
}

/// An event as it would be pushed to Loki.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LokiEntry {
    pub labels: AlarmLabels,
    pub message: String,
    pub metadata: AlarmMetadata,
    pub timestamp_ns: i64,
}

impl LokiEntry {
    /// `received_at` is used when the event timestamp cannot be parsed.
    pub fn from_event(event: &CanonicalEvent, received_at: DateTime<Utc>) -> Self {
        let timestamp_ns = parse_timestamp_ns(&event.timestamp).unwrap_or_else(|| {
            tracing::debug!(
                "Unparseable timestamp '{}', using receive time",
                event.timestamp
            );
            received_at.timestamp_nanos_opt().unwrap_or_default()
        });

        Self {
            labels: event.labels.clone(),
            message: event.message.clone(),
            metadata: event.metadata.clone(),
            timestamp_ns,
        }
    }

    /// Log line: the message merged with the metadata fields.
    pub fn line(&self) -> String {
        let mut line = serde_json::Map::new();
        line.insert("message".to_string(), Value::String(self.message.clone()));
        if let Value::Object(metadata) = json!(self.metadata) {
            line.extend(metadata);
        }
        Value::Object(line).to_string()
    }

    /// Body for `/loki/api/v1/push`.
    pub fn push_body(&self) -> Value {
        json!({
            "streams": [
                {
                    "stream": self.labels,
                    "values": [[self.timestamp_ns.to_string(), self.line()]]
                }
            ]
        })
    }
}
