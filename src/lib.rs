pub mod config;
pub mod enrichment;
pub mod error;
pub mod geometry;
pub mod location;
pub mod models;
pub mod recorder;
pub mod repository;
pub mod tracker;

pub use error::{EnrichmentError, LocationError, TrackingError};
pub use models::{Coordinate, Device, Trip};
pub use tracker::{Session, Tracker};
