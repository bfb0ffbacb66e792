//! Canonical alarm transform.
//!
//! Maps vendor alarm records onto [`CanonicalEvent`] using a [`FieldMapping`].
//! The function is total: unmapped roles and missing fields fall back to a
//! per-role default, so every input record yields exactly one event. It has
//! to produce the same output as the server-side transform it previews.

use crate::domain::mapping::{CanonicalRole, FieldMapping};
use crate::domain::model::{
    value_to_string, AlarmLabels, AlarmMetadata, CanonicalEvent, EventContext, IsaPriority,
    RawRecord,
};
use serde_json::Value;

const HIGH_SEVERITIES: [&str; 4] = ["critical", "high", "fault", "error"];
const MEDIUM_SEVERITIES: [&str; 3] = ["warning", "medium", "urgent"];

/// Default text used when a role is unmapped or its field is missing.
pub fn role_default(role: CanonicalRole) -> &'static str {
    match role {
        CanonicalRole::Severity => "info",
        CanonicalRole::Area | CanonicalRole::Equipment => "unknown",
        CanonicalRole::AlarmType => "generic",
        CanonicalRole::State => "ACTIVE",
        CanonicalRole::Timestamp
        | CanonicalRole::Message
        | CanonicalRole::Value
        | CanonicalRole::Threshold
        | CanonicalRole::Priority
        | CanonicalRole::VendorId => "",
    }
}

/// Coarse ISA-18.2 style bucket for a severity string. Case-insensitive.
pub fn severity_to_isa(severity: &str) -> IsaPriority {
    let sev = severity.to_lowercase();
    if HIGH_SEVERITIES.contains(&sev.as_str()) {
        IsaPriority::High
    } else if MEDIUM_SEVERITIES.contains(&sev.as_str()) {
        IsaPriority::Medium
    } else {
        IsaPriority::Low
    }
}

struct Lookup<'a> {
    raw: &'a RawRecord,
    mapping: &'a FieldMapping,
}

impl<'a> Lookup<'a> {
    fn value(&self, role: CanonicalRole) -> Option<&'a Value> {
        self.mapping.get(role).and_then(|field| self.raw.get(field))
    }

    fn text(&self, role: CanonicalRole) -> String {
        self.value(role)
            .map(value_to_string)
            .unwrap_or_else(|| role_default(role).to_string())
    }

    fn passthrough(&self, role: CanonicalRole) -> Value {
        self.value(role).cloned().unwrap_or(Value::Null)
    }
}

/// Transform a single record.
pub fn map_record(raw: &RawRecord, mapping: &FieldMapping, context: &EventContext) -> CanonicalEvent {
    let lookup = Lookup { raw, mapping };
    let severity = lookup.text(CanonicalRole::Severity).to_lowercase();
    let isa_priority = severity_to_isa(&severity).as_str().to_string();

    CanonicalEvent {
        timestamp: lookup.text(CanonicalRole::Timestamp),
        message: lookup.text(CanonicalRole::Message),
        labels: AlarmLabels {
            severity,
            area: lookup.text(CanonicalRole::Area),
            equipment: lookup.text(CanonicalRole::Equipment),
            alarm_type: lookup.text(CanonicalRole::AlarmType),
            isa_priority,
            source: context.source.clone(),
            connector_id: context.connector_id.clone(),
        },
        metadata: AlarmMetadata {
            state: lookup.text(CanonicalRole::State),
            value: lookup.passthrough(CanonicalRole::Value),
            threshold: lookup.passthrough(CanonicalRole::Threshold),
            priority: lookup.passthrough(CanonicalRole::Priority),
            vendor_alarm_id: lookup.text(CanonicalRole::VendorId),
            // 目前沒有來源欄位會影響這兩個值
            ack_required: true,
            shelved: false,
        },
    }
}

/// Transform every record with the placeholder source/connector labels.
pub fn apply_mapping(records: &[RawRecord], mapping: &FieldMapping) -> Vec<CanonicalEvent> {
    apply_mapping_with(records, mapping, &EventContext::default())
}

pub fn apply_mapping_with(
    records: &[RawRecord],
    mapping: &FieldMapping,
    context: &EventContext,
) -> Vec<CanonicalEvent> {
    records
        .iter()
        .map(|raw| map_record(raw, mapping, context))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        RawRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_severity_buckets() {
        for sev in ["critical", "HIGH", "Fault", "error"] {
            assert_eq!(severity_to_isa(sev), IsaPriority::High, "{}", sev);
        }
        for sev in ["warning", "Medium", "URGENT"] {
            assert_eq!(severity_to_isa(sev), IsaPriority::Medium, "{}", sev);
        }
        for sev in ["low", "info", "xyz", "", "diagnostic"] {
            assert_eq!(severity_to_isa(sev), IsaPriority::Low, "{}", sev);
        }
    }

    #[test]
    fn test_empty_mapping_yields_defaults() {
        let raw = record(json!({"Severity": "Critical", "Description": "ignored"}));
        let event = map_record(&raw, &FieldMapping::new(), &EventContext::default());

        assert_eq!(event.timestamp, "");
        assert_eq!(event.message, "");
        assert_eq!(event.labels.severity, "info");
        assert_eq!(event.labels.isa_priority, "low");
        assert_eq!(event.labels.area, "unknown");
        assert_eq!(event.labels.equipment, "unknown");
        assert_eq!(event.labels.alarm_type, "generic");
        assert_eq!(event.labels.source, "connector");
        assert_eq!(event.labels.connector_id, "configured");
        assert_eq!(event.metadata.state, "ACTIVE");
        assert_eq!(event.metadata.value, Value::Null);
        assert_eq!(event.metadata.threshold, Value::Null);
        assert_eq!(event.metadata.priority, Value::Null);
        assert_eq!(event.metadata.vendor_alarm_id, "");
        assert!(event.metadata.ack_required);
        assert!(!event.metadata.shelved);
    }

    #[test]
    fn test_mapped_fields_are_read_and_severity_lowercased() {
        let raw = record(json!({
            "sev": "CRITICAL",
            "ts": "2024-01-01T00:00:00Z",
            "msg": "Tank overflow"
        }));
        let mapping = FieldMapping::new()
            .with(CanonicalRole::Severity, "sev")
            .with(CanonicalRole::Timestamp, "ts")
            .with(CanonicalRole::Message, "msg");

        let event = map_record(&raw, &mapping, &EventContext::default());

        assert_eq!(event.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(event.message, "Tank overflow");
        assert_eq!(event.labels.severity, "critical");
        assert_eq!(event.labels.isa_priority, "high");
        assert_eq!(event.labels.area, "unknown");
        assert_eq!(event.labels.equipment, "unknown");
        assert_eq!(event.labels.alarm_type, "generic");
        assert_eq!(event.metadata.state, "ACTIVE");
        assert!(event.metadata.ack_required);
        assert!(!event.metadata.shelved);
    }

    #[test]
    fn test_missing_or_null_raw_field_falls_back() {
        let raw = record(json!({"Area": null}));
        let mapping = FieldMapping::new()
            .with(CanonicalRole::Area, "Area")
            .with(CanonicalRole::State, "State");
        let event = map_record(&raw, &mapping, &EventContext::default());
        assert_eq!(event.labels.area, "unknown");
        assert_eq!(event.metadata.state, "ACTIVE");
    }

    #[test]
    fn test_text_roles_are_stringified_and_numeric_roles_pass_through() {
        let raw = record(json!({
            "MessageNumber": 1234,
            "Acked": false,
            "ProcessValue": 87.3,
            "Limit": 80.0,
            "Priority": 12,
            "Class": 3
        }));
        let mapping = FieldMapping::new()
            .with(CanonicalRole::VendorId, "MessageNumber")
            .with(CanonicalRole::State, "Acked")
            .with(CanonicalRole::Severity, "Class")
            .with(CanonicalRole::Value, "ProcessValue")
            .with(CanonicalRole::Threshold, "Limit")
            .with(CanonicalRole::Priority, "Priority");

        let event = map_record(&raw, &mapping, &EventContext::default());

        assert_eq!(event.metadata.vendor_alarm_id, "1234");
        assert_eq!(event.metadata.state, "false");
        assert_eq!(event.labels.severity, "3");
        assert_eq!(event.labels.isa_priority, "low");
        assert_eq!(event.metadata.value, json!(87.3));
        assert_eq!(event.metadata.threshold, json!(80.0));
        assert_eq!(event.metadata.priority, json!(12));
    }

    #[test]
    fn test_context_labels_are_applied() {
        let context = EventContext {
            source: "plant-a".to_string(),
            connector_id: "c-42".to_string(),
        };
        let events = apply_mapping_with(&[RawRecord::new()], &FieldMapping::new(), &context);
        assert_eq!(events[0].labels.source, "plant-a");
        assert_eq!(events[0].labels.connector_id, "c-42");
    }
}
