//! In-memory trip history and device registry.

mod seed;

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::models::{Device, Trip};

/// Trips (most recent first) and known devices.
#[derive(Debug, Default)]
pub struct Repository {
    trips: RwLock<Vec<Trip>>,
    devices: RwLock<BTreeMap<String, Device>>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let devices = devices.into_iter().map(|d| (d.id.clone(), d)).collect();
        Self {
            trips: RwLock::default(),
            devices: RwLock::new(devices),
        }
    }

    /// Prepends a finalized trip. No deduplication.
    pub fn add_trip(&self, trip: Trip) {
        let mut trips = self.trips.write().unwrap_or_else(PoisonError::into_inner);
        trips.insert(0, trip);
    }

    pub fn trips(&self) -> Vec<Trip> {
        self.trips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn trip(&self, id: &str) -> Option<Trip> {
        self.trips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.trips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|t| t.distance)
            .sum()
    }

    pub fn device(&self, id: &str) -> Option<Device> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// All devices ordered by identifier.
    pub fn devices(&self) -> Vec<Device> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}
