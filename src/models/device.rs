use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[serde(alias = "smartphone")]
    Handheld,
    Tracker,
    Vehicle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

/// Battery charge in percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BatteryLevel(u8);

impl BatteryLevel {
    pub fn percent(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for BatteryLevel {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 100 {
            return Err(ModelError::InvalidBattery(value));
        }
        Ok(Self(value))
    }
}

impl From<BatteryLevel> for u8 {
    fn from(level: BatteryLevel) -> Self {
        level.0
    }
}

/// A registered tracking endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub status: DeviceStatus,
    pub battery: BatteryLevel,
    pub last_seen: String,
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: DeviceKind,
        status: DeviceStatus,
        battery: u8,
        last_seen: impl Into<String>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            id: id.into(),
            name: name.into(),
            kind,
            status,
            battery: BatteryLevel::try_from(battery)?,
            last_seen: last_seen.into(),
        })
    }

    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }
}
