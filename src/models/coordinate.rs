use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One GPS sample as delivered by the location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
    /// Capture time in epoch milliseconds.
    pub timestamp: i64,
    /// Instantaneous speed in m/s, absent when the sensor can't tell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64, timestamp: i64) -> Self {
        Self {
            lat,
            lng,
            timestamp,
            speed: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn speed_kmh(&self) -> Option<f64> {
        self.speed.map(|s| s * 3.6)
    }
}
