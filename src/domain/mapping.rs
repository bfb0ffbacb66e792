use serde::{Deserialize, Serialize};
use std::fmt;

/// 畫面上分組用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleGroup {
    Core,
    Labels,
    Metadata,
}

/// The fixed set of canonical slots a vendor field can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalRole {
    Timestamp,
    Message,
    Severity,
    Area,
    Equipment,
    AlarmType,
    State,
    Value,
    Threshold,
    Priority,
    VendorId,
}

impl CanonicalRole {
    pub const ALL: [CanonicalRole; 11] = [
        CanonicalRole::Timestamp,
        CanonicalRole::Message,
        CanonicalRole::Severity,
        CanonicalRole::Area,
        CanonicalRole::Equipment,
        CanonicalRole::AlarmType,
        CanonicalRole::State,
        CanonicalRole::Value,
        CanonicalRole::Threshold,
        CanonicalRole::Priority,
        CanonicalRole::VendorId,
    ];

    /// Key used in mapping documents, e.g. `severity_field`.
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalRole::Timestamp => "timestamp_field",
            CanonicalRole::Message => "message_field",
            CanonicalRole::Severity => "severity_field",
            CanonicalRole::Area => "area_field",
            CanonicalRole::Equipment => "equipment_field",
            CanonicalRole::AlarmType => "alarm_type_field",
            CanonicalRole::State => "state_field",
            CanonicalRole::Value => "value_field",
            CanonicalRole::Threshold => "threshold_field",
            CanonicalRole::Priority => "priority_field",
            CanonicalRole::VendorId => "vendor_id_field",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CanonicalRole::Timestamp => "Timestamp",
            CanonicalRole::Message => "Message / Description",
            CanonicalRole::Severity => "Severity",
            CanonicalRole::Area => "Area / Zone",
            CanonicalRole::Equipment => "Equipment / Tag",
            CanonicalRole::AlarmType => "Alarm Type",
            CanonicalRole::State => "Alarm State",
            CanonicalRole::Value => "Process Value",
            CanonicalRole::Threshold => "Threshold / Limit",
            CanonicalRole::Priority => "Priority",
            CanonicalRole::VendorId => "Vendor Alarm ID",
        }
    }

    pub fn group(&self) -> RoleGroup {
        match self {
            CanonicalRole::Timestamp | CanonicalRole::Message => RoleGroup::Core,
            CanonicalRole::Severity
            | CanonicalRole::Area
            | CanonicalRole::Equipment
            | CanonicalRole::AlarmType => RoleGroup::Labels,
            CanonicalRole::State
            | CanonicalRole::Value
            | CanonicalRole::Threshold
            | CanonicalRole::Priority
            | CanonicalRole::VendorId => RoleGroup::Metadata,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            CanonicalRole::Timestamp | CanonicalRole::Message | CanonicalRole::Severity
        )
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.key() == key)
    }
}

impl fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// User-configured association between canonical roles and raw vendor field names.
///
/// An absent entry or an empty field name both mean "unmapped".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_type_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id_field: Option<String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper, mostly for tests and vendor defaults.
    pub fn with(mut self, role: CanonicalRole, field: &str) -> Self {
        self.set(role, Some(field.to_string()));
        self
    }

    fn slot(&self, role: CanonicalRole) -> &Option<String> {
        match role {
            CanonicalRole::Timestamp => &self.timestamp_field,
            CanonicalRole::Message => &self.message_field,
            CanonicalRole::Severity => &self.severity_field,
            CanonicalRole::Area => &self.area_field,
            CanonicalRole::Equipment => &self.equipment_field,
            CanonicalRole::AlarmType => &self.alarm_type_field,
            CanonicalRole::State => &self.state_field,
            CanonicalRole::Value => &self.value_field,
            CanonicalRole::Threshold => &self.threshold_field,
            CanonicalRole::Priority => &self.priority_field,
            CanonicalRole::VendorId => &self.vendor_id_field,
        }
    }

    fn slot_mut(&mut self, role: CanonicalRole) -> &mut Option<String> {
        match role {
            CanonicalRole::Timestamp => &mut self.timestamp_field,
            CanonicalRole::Message => &mut self.message_field,
            CanonicalRole::Severity => &mut self.severity_field,
            CanonicalRole::Area => &mut self.area_field,
            CanonicalRole::Equipment => &mut self.equipment_field,
            CanonicalRole::AlarmType => &mut self.alarm_type_field,
            CanonicalRole::State => &mut self.state_field,
            CanonicalRole::Value => &mut self.value_field,
            CanonicalRole::Threshold => &mut self.threshold_field,
            CanonicalRole::Priority => &mut self.priority_field,
            CanonicalRole::VendorId => &mut self.vendor_id_field,
        }
    }

    /// Raw field name mapped to `role`, if any.
    pub fn get(&self, role: CanonicalRole) -> Option<&str> {
        self.slot(role).as_deref().filter(|field| !field.is_empty())
    }

    /// Setting an empty string clears the role, same as the editor does.
    pub fn set(&mut self, role: CanonicalRole, field: Option<String>) {
        *self.slot_mut(role) = field.filter(|f| !f.is_empty());
    }

    pub fn mapped_roles(&self) -> Vec<(CanonicalRole, &str)> {
        CanonicalRole::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|field| (role, field)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mapped_roles().is_empty()
    }

    /// Lay `saved` on top of `self`. Any entry present in `saved` wins, an
    /// explicitly empty one included, so a saved mapping can unmap a default.
    pub fn overlay(&self, saved: &FieldMapping) -> FieldMapping {
        let mut merged = FieldMapping::new();
        for role in CanonicalRole::ALL {
            *merged.slot_mut(role) = saved
                .slot(role)
                .clone()
                .or_else(|| self.slot(role).clone());
        }
        merged
    }

    pub fn missing_required(&self) -> Vec<CanonicalRole> {
        CanonicalRole::ALL
            .into_iter()
            .filter(|role| role.is_required() && self.get(*role).is_none())
            .collect()
    }

    /// Mapped field names that do not show up in `available`.
    pub fn unknown_fields<'a>(&'a self, available: &[String]) -> Vec<(CanonicalRole, &'a str)> {
        self.mapped_roles()
            .into_iter()
            .filter(|(_, field)| !available.iter().any(|a| a.as_str() == *field))
            .collect()
    }
}
