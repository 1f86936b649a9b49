// ── Sensor registry ──
//
// Named values read out of a snapshot. Each description pairs display
// metadata with a pure extraction function; consumers iterate `SENSORS`
// instead of knowing object paths.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::model::{Endpoint, EndpointResult, Snapshot};
use crate::path;

/// A single sensor state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SensorValue {
    /// Convert a raw JSON leaf. Containers, nulls and blank strings yield
    /// `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.trim().to_owned())),
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Text(s) => s.parse().ok(),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// What kind of quantity a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceClass {
    SignalStrength,
    DataSize,
    Duration,
}

/// How a sensor's value evolves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

/// Static description of one sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    /// Material Design icon name.
    pub icon: &'static str,
    pub unit: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub enabled_by_default: bool,
    /// Endpoint the value is read from; the sensor is unavailable while
    /// that query fails.
    pub endpoint: Endpoint,
    pub value_fn: fn(&Snapshot) -> Option<SensorValue>,
}

/// Current state of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub key: &'static str,
    pub name: &'static str,
    pub value: Option<SensorValue>,
    pub unit: Option<&'static str>,
    pub available: bool,
    pub enabled_by_default: bool,
}

pub static SENSORS: &[SensorDescription] = &[
    SensorDescription {
        key: "rssi",
        name: "RSSI",
        icon: "mdi:wifi-check",
        unit: Some("dBm"),
        device_class: Some(DeviceClass::SignalStrength),
        state_class: Some(StateClass::Measurement),
        enabled_by_default: true,
        endpoint: Endpoint::CellInfo,
        value_fn: |s| cell_field(s, "RSSI"),
    },
    SensorDescription {
        key: "rsrq",
        name: "RSRQ",
        icon: "mdi:wifi-arrow-up-down",
        unit: Some("dB"),
        device_class: Some(DeviceClass::SignalStrength),
        state_class: Some(StateClass::Measurement),
        enabled_by_default: false,
        endpoint: Endpoint::CellInfo,
        value_fn: |s| cell_field(s, "X_ZYXEL_RSRQ"),
    },
    SensorDescription {
        key: "rsrp",
        name: "RSRP",
        icon: "mdi:wifi-arrow-down",
        unit: Some("dBm"),
        device_class: Some(DeviceClass::SignalStrength),
        state_class: Some(StateClass::Measurement),
        enabled_by_default: false,
        endpoint: Endpoint::CellInfo,
        value_fn: |s| cell_field(s, "X_ZYXEL_RSRP"),
    },
    SensorDescription {
        key: "sinr",
        name: "SINR",
        icon: "mdi:wifi-alert",
        unit: Some("dB"),
        device_class: None,
        state_class: Some(StateClass::Measurement),
        enabled_by_default: false,
        endpoint: Endpoint::CellInfo,
        value_fn: |s| cell_field(s, "X_ZYXEL_SINR"),
    },
    SensorDescription {
        key: "network_technology",
        name: "Network technology",
        icon: "mdi:radio-tower",
        unit: None,
        device_class: None,
        state_class: None,
        enabled_by_default: true,
        endpoint: Endpoint::CellInfo,
        value_fn: |s| cell_field(s, "CurrentAccessTechnology"),
    },
    SensorDescription {
        key: "network_band",
        name: "Network band",
        icon: "mdi:signal-5g",
        unit: None,
        device_class: None,
        state_class: None,
        enabled_by_default: false,
        endpoint: Endpoint::CellInfo,
        value_fn: |s| cell_field(s, "X_ZYXEL_CurrentBand"),
    },
    SensorDescription {
        key: "connected_devices",
        name: "Connected devices",
        icon: "mdi:devices",
        unit: None,
        device_class: None,
        state_class: Some(StateClass::Measurement),
        enabled_by_default: true,
        endpoint: Endpoint::LanHosts,
        value_fn: connected_devices,
    },
    SensorDescription {
        key: "wan_bytes_sent",
        name: "WAN bytes sent",
        icon: "mdi:upload-network",
        unit: Some("B"),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::TotalIncreasing),
        enabled_by_default: true,
        endpoint: Endpoint::Traffic,
        value_fn: |s| wan_counter(s, "BytesSent"),
    },
    SensorDescription {
        key: "wan_bytes_received",
        name: "WAN bytes received",
        icon: "mdi:download-network",
        unit: Some("B"),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::TotalIncreasing),
        enabled_by_default: true,
        endpoint: Endpoint::Traffic,
        value_fn: |s| wan_counter(s, "BytesReceived"),
    },
    SensorDescription {
        key: "uptime",
        name: "Uptime",
        icon: "mdi:timer-outline",
        unit: Some("s"),
        device_class: Some(DeviceClass::Duration),
        state_class: None,
        enabled_by_default: false,
        endpoint: Endpoint::DeviceStatus,
        value_fn: |s| {
            s.lookup(Endpoint::DeviceStatus.oid(), &path!["DeviceInfo", "UpTime"])
                .ok()
                .and_then(SensorValue::from_json)
        },
    },
];

fn cell_field(snapshot: &Snapshot, field: &str) -> Option<SensorValue> {
    snapshot
        .lookup(Endpoint::CellInfo.oid(), &path!["CellIntfInfo", field])
        .ok()
        .and_then(SensorValue::from_json)
}

/// The first IP interface carries the WAN counters.
fn wan_counter(snapshot: &Snapshot, field: &str) -> Option<SensorValue> {
    snapshot
        .lookup(Endpoint::Traffic.oid(), &path!["ipIfaceSt", 0_usize, field])
        .ok()
        .and_then(SensorValue::from_json)
}

fn connected_devices(snapshot: &Snapshot) -> Option<SensorValue> {
    let hosts = snapshot
        .lookup(Endpoint::LanHosts.oid(), &path!["lanhosts"])
        .ok()?
        .as_array()?;
    let active = hosts
        .iter()
        .filter(|h| h.get("Active").and_then(Value::as_bool).unwrap_or(false))
        .count();
    i64::try_from(active).ok().map(SensorValue::Integer)
}

/// Look a sensor up by key.
pub fn sensor(key: &str) -> Option<&'static SensorDescription> {
    SENSORS.iter().find(|d| d.key == key)
}

/// Evaluate every registered sensor against `snapshot`.
///
/// A sensor is unavailable when its endpoint is missing from the snapshot
/// or failed. A value missing from a successful result is logged.
pub fn read_sensors(snapshot: &Snapshot) -> Vec<SensorReading> {
    SENSORS
        .iter()
        .map(|desc| {
            let oid = desc.endpoint.oid();
            let available = snapshot.entry(oid).is_some_and(EndpointResult::is_ok);
            let value = if available { (desc.value_fn)(snapshot) } else { None };
            if available && value.is_none() {
                warn!(sensor = desc.key, oid, "sensor value not present in response");
            }
            SensorReading {
                key: desc.key,
                name: desc.name,
                value,
                unit: desc.unit,
                available,
                enabled_by_default: desc.enabled_by_default,
            }
        })
        .collect()
}
