//! Error types for tracking, location sensing and trip enrichment.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to the caller of [`Tracker::start`](crate::tracker::Tracker::start).
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Location sensing is not supported in this environment.
    #[error("geolocation is not supported on this device")]
    CapabilityUnavailable,

    /// The location source refused to open a watch.
    #[error("failed to open location watch: {0}")]
    Watch(#[from] LocationError),
}

/// Kind of failure reported by a location source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl fmt::Display for LocationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PermissionDenied => "permission denied",
            Self::PositionUnavailable => "position unavailable",
            Self::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// A transient error from the location source.
///
/// While a session is active these are logged and swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct LocationError {
    pub code: LocationErrorCode,
    pub message: String,
}

impl LocationError {
    pub fn new(code: LocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failure generating a trip summary. Never escapes the enricher.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("no API key configured for the text generation service")]
    MissingApiKey,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Invalid values in the data model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("battery level {0} is outside 0..=100")]
    InvalidBattery(u8),
}
