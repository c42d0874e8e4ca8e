use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use super::coordinate::Coordinate;
use crate::geometry;

/// Tags attached to every freshly recorded trip.
pub const DEFAULT_TAGS: &[&str] = &["new-trip"];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// A finalized recording. Only `summary` may change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    /// Kilometers.
    pub distance: f64,
    /// km/h.
    pub avg_speed: f64,
    pub path: Vec<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub tags: Vec<String>,
}

impl Trip {
    /// Builds a draft trip from a finished session's samples.
    ///
    /// Date and end time come from `ended_at`; the start time is the first
    /// sample's capture time in the same time zone.
    pub fn record<Tz>(path: Vec<Coordinate>, ended_at: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let started_at = path
            .first()
            .and_then(Coordinate::captured_at)
            .map(|t| t.with_timezone(&ended_at.timezone()))
            .unwrap_or_else(|| ended_at.clone());

        Self {
            id: Uuid::new_v4().to_string(),
            date: ended_at.format(DATE_FORMAT).to_string(),
            start_time: started_at.format(TIME_FORMAT).to_string(),
            end_time: ended_at.format(TIME_FORMAT).to_string(),
            distance: geometry::path_distance_km(&path),
            avg_speed: geometry::average_speed_kmh(&path),
            path,
            summary: None,
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn is_summarized(&self) -> bool {
        self.summary.is_some()
    }

    /// Attaches a summary unless one is already present.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        if self.summary.is_none() {
            self.summary = Some(summary.into());
        }
        self
    }

    /// Minutes between the first and last recorded sample.
    pub fn duration_minutes(&self) -> f64 {
        geometry::elapsed_hours(&self.path) * 60.0
    }
}
