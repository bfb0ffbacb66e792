use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One alarm as the vendor produced it. Field order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    pub data: Map<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` unless `value` is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(data) => Some(Self { data }),
            _ => None,
        }
    }

    /// Field value, treating an explicit `null` the same as an absent field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field).filter(|v| !v.is_null())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.data.insert(field.into(), value);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Field value as text, `""` when absent.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(value_to_string).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

/// Render a JSON value as plain text.
///
/// Integral floats print without a fraction (`1.0` -> `"1"`) so numeric
/// vendor fields read the same as they do in the browser preview.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsaPriority {
    High,
    Medium,
    Low,
}

impl IsaPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsaPriority::High => "high",
            IsaPriority::Medium => "medium",
            IsaPriority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmLabels {
    pub severity: String,
    pub area: String,
    pub equipment: String,
    pub alarm_type: String,
    pub isa_priority: String,
    pub source: String,
    pub connector_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmMetadata {
    pub state: String,
    pub value: Value,
    pub threshold: Value,
    pub priority: Value,
    pub vendor_alarm_id: String,
    pub ack_required: bool,
    pub shelved: bool,
}

/// Normalized alarm shared across all connectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub timestamp: String,
    pub message: String,
    pub labels: AlarmLabels,
    pub metadata: AlarmMetadata,
}

/// Values for the labels that do not come from the raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub source: String,
    pub connector_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self {
            source: "connector".to_string(),
            connector_id: "configured".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewResult {
    pub events: Vec<CanonicalEvent>,
    pub total_records: usize,
    pub shown_records: usize,
    pub available_fields: Vec<String>,
    pub missing_required: Vec<String>,
}
