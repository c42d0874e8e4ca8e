//! Path geometry on the sphere: great-circle distances and derived speeds.

use geo::{Distance, Haversine, Point};

use crate::models::Coordinate;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

fn point(coord: &Coordinate) -> Point<f64> {
    Point::new(coord.lng, coord.lat)
}

/// Great-circle distance between two samples in kilometers.
pub fn segment_km(from: &Coordinate, to: &Coordinate) -> f64 {
    Haversine.distance(point(from), point(to)) / 1000.0
}

/// Sum of the distances between consecutive samples, in kilometers.
pub fn path_distance_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| segment_km(&w[0], &w[1])).sum()
}

/// Hours between the first and the last sample. Zero for fewer than two samples.
pub fn elapsed_hours(path: &[Coordinate]) -> f64 {
    match (path.first(), path.last()) {
        (Some(first), Some(last)) if path.len() >= 2 => {
            last.timestamp.saturating_sub(first.timestamp) as f64 / MILLIS_PER_HOUR
        }
        _ => 0.0,
    }
}

/// Average speed over the whole path in km/h.
///
/// Reported as 0 when the path has fewer than two samples or no time elapsed
/// between its endpoints.
pub fn average_speed_kmh(path: &[Coordinate]) -> f64 {
    let hours = elapsed_hours(path);
    if hours <= 0.0 {
        return 0.0;
    }
    path_distance_km(path) / hours
}
