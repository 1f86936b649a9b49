use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Known DAL objects.
///
/// The client accepts any oid string; this enum names the ones the
/// coordinator and the sensor registry know how to read.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum Endpoint {
    /// Cellular interface and signal quality.
    #[strum(serialize = "status")]
    #[serde(rename = "status")]
    CellInfo,
    /// Device identity and uptime. The same object backs the generic card
    /// status page.
    #[strum(serialize = "cardpage_status")]
    #[serde(rename = "cardpage_status")]
    DeviceStatus,
    /// Hosts seen on the LAN.
    #[strum(serialize = "lanhosts")]
    #[serde(rename = "lanhosts")]
    LanHosts,
    /// Per-interface traffic counters.
    #[strum(serialize = "Traffic_Status")]
    #[serde(rename = "Traffic_Status")]
    Traffic,
}

impl Endpoint {
    /// Oid passed to `GET /cgi-bin/DAL`.
    pub fn oid(self) -> &'static str {
        self.into()
    }

    /// Short human label.
    pub fn label(self) -> &'static str {
        match self {
            Self::CellInfo => "Cell info",
            Self::DeviceStatus => "Device status",
            Self::LanHosts => "LAN hosts",
            Self::Traffic => "Traffic",
        }
    }

    /// Every known oid, in polling order.
    pub fn default_oids() -> Vec<String> {
        Self::iter().map(|e| e.oid().to_owned()).collect()
    }

    /// Resolve a known endpoint from its oid.
    pub fn from_oid(oid: &str) -> Option<Self> {
        oid.parse().ok()
    }
}
