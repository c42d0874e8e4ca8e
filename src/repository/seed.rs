use super::Repository;
use crate::models::{Device, DeviceKind, DeviceStatus, Trip};

impl Repository {
    /// A repository preloaded with demo history and paired devices.
    pub fn with_sample_data() -> Self {
        let devices = [
            Device::new("1", "iPhone 15 Pro", DeviceKind::Handheld, DeviceStatus::Online, 85, "Just now"),
            Device::new("2", "Van Tracker", DeviceKind::Vehicle, DeviceStatus::Offline, 42, "2 hours ago"),
        ]
        .into_iter()
        .flatten();

        let repo = Self::with_devices(devices);
        // Oldest first so the newest ends up on top.
        for trip in sample_trips().into_iter().rev() {
            repo.add_trip(trip);
        }
        repo
    }
}

fn sample_trips() -> Vec<Trip> {
    vec![
        Trip {
            id: "t1".to_string(),
            date: "2023-10-24".to_string(),
            start_time: "08:30".to_string(),
            end_time: "09:15".to_string(),
            distance: 5.2,
            avg_speed: 12.5,
            path: Vec::new(),
            summary: Some("Morning commute through the park. Good pace!".to_string()),
            tags: vec!["commute".to_string(), "morning".to_string()],
        },
        Trip {
            id: "t2".to_string(),
            date: "2023-10-23".to_string(),
            start_time: "18:10".to_string(),
            end_time: "19:00".to_string(),
            distance: 12.8,
            avg_speed: 25.2,
            path: Vec::new(),
            summary: Some("Evening cycle around the lake. Great cardio session.".to_string()),
            tags: vec!["fitness".to_string(), "evening".to_string()],
        },
    ]
}
