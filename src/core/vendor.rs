//! Built-in vendor profiles: default field mappings and representative sample
//! alarms for each supported SCADA connector type.

use crate::domain::mapping::{CanonicalRole, FieldMapping};
use crate::domain::model::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorKind {
    Ignition,
    #[serde(rename = "factorytalk")]
    FactoryTalk,
    #[serde(rename = "wincc")]
    WinCc,
    PlantScada,
}

impl VendorKind {
    pub const ALL: [VendorKind; 4] = [
        VendorKind::Ignition,
        VendorKind::FactoryTalk,
        VendorKind::WinCc,
        VendorKind::PlantScada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorKind::Ignition => "ignition",
            VendorKind::FactoryTalk => "factorytalk",
            VendorKind::WinCc => "wincc",
            VendorKind::PlantScada => "plant_scada",
        }
    }

    pub fn default_mapping(&self) -> FieldMapping {
        let fields: [&str; 11] = match self {
            VendorKind::Ignition => [
                "eventTime",
                "label",
                "severity",
                "area",
                "source",
                "name",
                "eventState",
                "currentValue",
                "setpointValue",
                "priority",
                "id",
            ],
            VendorKind::FactoryTalk => [
                "TimeStamp",
                "Description",
                "Severity",
                "Area",
                "TagName",
                "AlarmName",
                "State",
                "Value",
                "Limit",
                "Priority",
                "AlarmId",
            ],
            VendorKind::WinCc => [
                "DateTime",
                "AlarmText",
                "Class",
                "Unit",
                "Tag",
                "Class",
                "State",
                "ProcessValue",
                "Limit",
                "Priority",
                "EventId",
            ],
            VendorKind::PlantScada => [
                "Time",
                "Description",
                "Category",
                "Area",
                "Equipment",
                "Tag",
                "State",
                "Value",
                "High",
                "Priority",
                "AlarmID",
            ],
        };

        // 順序與 CanonicalRole::ALL 相同
        CanonicalRole::ALL
            .into_iter()
            .zip(fields)
            .fold(FieldMapping::new(), |mapping, (role, field)| {
                mapping.with(role, field)
            })
    }

    pub fn sample_records(&self) -> Vec<RawRecord> {
        let samples = match self {
            VendorKind::Ignition => json!([
                {
                    "id": "ALM-2024-00451",
                    "eventTime": "2026-02-26T14:30:00.000Z",
                    "name": "HighTemperature",
                    "label": "Boiler 01 temperature exceeded 450°F threshold",
                    "severity": "high",
                    "priority": 1,
                    "source": "Boiler01/TempAlarm",
                    "area": "Boiler Room",
                    "displayPath": "Plant A/Boiler Room",
                    "eventState": "Active",
                    "currentValue": 462.5,
                    "setpointValue": 450.0,
                    "ackRequired": true,
                    "shelved": false
                },
                {
                    "id": "ALM-2024-00452",
                    "eventTime": "2026-02-26T14:28:15.000Z",
                    "name": "LowPressure",
                    "label": "Pump 02 suction pressure below minimum",
                    "severity": "medium",
                    "priority": 2,
                    "source": "Pump02/PressureAlarm",
                    "area": "Pump Room",
                    "displayPath": "Plant A/Pump Room",
                    "eventState": "Active",
                    "currentValue": 12.3,
                    "setpointValue": 15.0,
                    "ackRequired": true,
                    "shelved": false
                },
                {
                    "id": "ALM-2024-00453",
                    "eventTime": "2026-02-26T14:15:00.000Z",
                    "name": "MotorFault",
                    "label": "Conveyor motor drive fault detected",
                    "severity": "critical",
                    "priority": 0,
                    "source": "Conveyor01/DriveAlarm",
                    "area": "Production Floor",
                    "displayPath": "Plant A/Production Floor",
                    "eventState": "Active",
                    "currentValue": 1.0,
                    "setpointValue": 0.0,
                    "ackRequired": true,
                    "shelved": false
                }
            ]),
            VendorKind::FactoryTalk => json!([
                {
                    "AlarmId": "FT-2024-001",
                    "TimeStamp": "2026-02-26T14:30:00.000",
                    "AlarmName": "HIGH_TEMP_TK01",
                    "Description": "Tank 01 temperature exceeded high limit",
                    "Severity": "Critical",
                    "Priority": "High",
                    "Area": "TANK_FARM",
                    "TagName": "TK01_TEMP_HH",
                    "State": "Unacknowledged",
                    "Value": 95.2,
                    "Limit": 90.0,
                    "Acknowledged": false
                },
                {
                    "AlarmId": "FT-2024-002",
                    "TimeStamp": "2026-02-26T14:25:30.000",
                    "AlarmName": "LOW_LEVEL_V02",
                    "Description": "Vessel 02 level below low-low setpoint",
                    "Severity": "Warning",
                    "Priority": "Medium",
                    "Area": "MIXING_AREA",
                    "TagName": "V02_LVL_LL",
                    "State": "Acknowledged",
                    "Value": 8.5,
                    "Limit": 10.0,
                    "Acknowledged": true
                },
                {
                    "AlarmId": "FT-2024-003",
                    "TimeStamp": "2026-02-26T14:10:00.000",
                    "AlarmName": "VIBRATION_P03",
                    "Description": "Pump 03 vibration above threshold",
                    "Severity": "Warning",
                    "Priority": "Low",
                    "Area": "PUMP_STATION",
                    "TagName": "P03_VIB",
                    "State": "Unacknowledged",
                    "Value": 12.7,
                    "Limit": 10.0,
                    "Acknowledged": false
                }
            ]),
            VendorKind::WinCc => json!([
                {
                    "MessageNumber": 1234,
                    "DateTime": "26.02.2026 14:30:00",
                    "AlarmText": "Motor MU_01 overtemperature",
                    "Class": "Error",
                    "Priority": 12,
                    "Unit": "MU_01",
                    "Tag": "M01_TEMP",
                    "State": "COME",
                    "ProcessValue": 87.3,
                    "Limit": 80.0,
                    "EventId": "WCC-14302-MU01"
                },
                {
                    "MessageNumber": 1235,
                    "DateTime": "26.02.2026 14:27:45",
                    "AlarmText": "PLC rack fault: communication lost",
                    "Class": "Fault",
                    "Priority": 16,
                    "Unit": "PLC_02",
                    "Tag": "PLC02_COMM",
                    "State": "COME",
                    "ProcessValue": 0.0,
                    "Limit": 1.0,
                    "EventId": "WCC-14278-PLC02"
                },
                {
                    "MessageNumber": 1236,
                    "DateTime": "26.02.2026 14:15:00",
                    "AlarmText": "Cooling water flow below minimum",
                    "Class": "Warning",
                    "Priority": 8,
                    "Unit": "CW_LOOP",
                    "Tag": "CW_FLOW",
                    "State": "COME",
                    "ProcessValue": 45.2,
                    "Limit": 50.0,
                    "EventId": "WCC-14150-CW01"
                }
            ]),
            VendorKind::PlantScada => json!([
                {
                    "AlarmID": "CIT-4521",
                    "Time": "2026-02-26T14:30:00",
                    "Tag": "PUMP_01_FAULT",
                    "Description": "Pump 01 high vibration, maintenance required",
                    "Category": "Warning",
                    "Priority": 3,
                    "Equipment": "PUMP_01",
                    "Area": "ZONE_A",
                    "State": "Active",
                    "Value": 12.5,
                    "High": 10.0,
                    "Acknowledged": false
                },
                {
                    "AlarmID": "CIT-4522",
                    "Time": "2026-02-26T14:22:00",
                    "Tag": "REACTOR_PRESS_HH",
                    "Description": "Reactor R02 pressure high-high alarm",
                    "Category": "Critical",
                    "Priority": 1,
                    "Equipment": "REACTOR_02",
                    "Area": "REACTOR_BAY",
                    "State": "Active",
                    "Value": 18.7,
                    "High": 15.0,
                    "Acknowledged": false
                },
                {
                    "AlarmID": "CIT-4523",
                    "Time": "2026-02-26T14:05:00",
                    "Tag": "TANK_LEVEL_LL",
                    "Description": "Feed tank T03 level low-low",
                    "Category": "Urgent",
                    "Priority": 2,
                    "Equipment": "TANK_03",
                    "Area": "FEED_AREA",
                    "State": "Active",
                    "Value": 3.2,
                    "High": 5.0,
                    "Acknowledged": false
                }
            ]),
        };

        match samples {
            serde_json::Value::Array(items) => {
                items.into_iter().filter_map(RawRecord::from_value).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        VendorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown connector type: {}", s))
    }
}

/// Vendor defaults with the saved mapping laid on top.
///
/// Without a known vendor the saved mapping is used as is.
pub fn resolve_mapping(vendor: Option<VendorKind>, saved: &FieldMapping) -> FieldMapping {
    match vendor {
        Some(kind) => kind.default_mapping().overlay(saved),
        None => saved.clone(),
    }
}

/// Sample alarms for a connector type string; unknown types get the Ignition set.
pub fn samples_for(connector_type: &str) -> Vec<RawRecord> {
    connector_type
        .parse::<VendorKind>()
        .unwrap_or(VendorKind::Ignition)
        .sample_records()
}
