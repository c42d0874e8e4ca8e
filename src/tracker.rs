//! Recording sessions: start a location watch, accumulate samples and turn
//! them into a draft [`Trip`] on stop.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::TrackingError;
use crate::geometry;
use crate::location::{EventReceiver, LocationEvent, LocationSource, WatchHandle, WatchOptions};
use crate::models::{Coordinate, Trip};

/// Sessions with fewer samples are discarded on stop.
pub const MIN_TRIP_SAMPLES: usize = 3;

#[derive(Debug)]
struct Watch {
    handle: WatchHandle,
    events: EventReceiver,
}

/// State of the current (or last) recording attempt.
#[derive(Debug, Default)]
pub struct Session {
    active: bool,
    path: Vec<Coordinate>,
    current_position: Option<Coordinate>,
    watch: Option<Watch>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Samples accumulated so far, in capture order.
    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    pub fn current_position(&self) -> Option<&Coordinate> {
        self.current_position.as_ref()
    }

    pub fn distance_km(&self) -> f64 {
        geometry::path_distance_km(&self.path)
    }

    pub fn live_speed_kmh(&self) -> f64 {
        self.current_position
            .and_then(|c| c.speed_kmh())
            .unwrap_or(0.0)
    }

    fn apply(&mut self, event: LocationEvent) -> bool {
        match event {
            LocationEvent::Sample(coord) if self.active => {
                self.current_position = Some(coord);
                self.path.push(coord);
                true
            }
            LocationEvent::Sample(_) => false,
            LocationEvent::Error(e) => {
                // Transient sensor errors must not end the trip.
                warn!("Location error while tracking: {}", e);
                false
            }
        }
    }
}

pub struct Tracker<S: LocationSource> {
    source: S,
    options: WatchOptions,
    session: Session,
}

impl<S: LocationSource> Tracker<S> {
    pub fn new(source: S, options: WatchOptions) -> Self {
        Self {
            source,
            options,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_active(&self) -> bool {
        self.session.active
    }

    pub fn current_position(&self) -> Option<&Coordinate> {
        self.session.current_position()
    }

    /// Begins a new session.
    ///
    /// Calling this while a session is active discards that session and
    /// releases its watch before opening a new one.
    pub fn start(&mut self) -> Result<(), TrackingError> {
        if !self.source.is_available() {
            warn!("Cannot start tracking: geolocation unavailable");
            return Err(TrackingError::CapabilityUnavailable);
        }

        if self.session.active {
            warn!(
                "Start requested while tracking; discarding {} samples",
                self.session.path.len()
            );
            self.release_watch();
            self.session.active = false;
        }

        self.session.path.clear();
        self.session.current_position = None;

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = self.source.subscribe(self.options, tx)?;
        self.session.watch = Some(Watch { handle, events: rx });
        self.session.active = true;

        info!("Started tracking (watch {:?})", handle);
        Ok(())
    }

    /// Applies a single event from the source. Returns `true` if a sample
    /// was appended to the session.
    pub fn ingest(&mut self, event: LocationEvent) -> bool {
        self.session.apply(event)
    }

    /// Ingests every event already queued by the source without waiting.
    pub fn pump(&mut self) -> usize {
        let mut appended = 0;
        loop {
            let event = match self.session.watch.as_mut().map(|w| w.events.try_recv()) {
                Some(Ok(event)) => event,
                _ => break,
            };
            if self.session.apply(event) {
                appended += 1;
            }
        }
        appended
    }

    /// Waits for the next event from the source and ingests it.
    ///
    /// Resolves to `None` when no session is active or the source closed
    /// the watch.
    pub async fn next_event(&mut self) -> Option<LocationEvent> {
        let event = self.session.watch.as_mut()?.events.recv().await?;
        self.session.apply(event.clone());
        Some(event)
    }

    /// Ends the session at the local wall-clock time.
    pub fn stop(&mut self) -> Option<Trip> {
        self.stop_at(Local::now())
    }

    /// Ends the session and returns the draft trip, if the session was long
    /// enough to be worth keeping. Stopping an idle tracker does nothing.
    pub fn stop_at<Tz>(&mut self, ended_at: DateTime<Tz>) -> Option<Trip>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if !self.session.active {
            self.release_watch();
            debug!("Stop requested while idle");
            return None;
        }

        self.pump();
        self.release_watch();
        self.session.active = false;

        let path = std::mem::take(&mut self.session.path);
        self.session.current_position = None;
        if path.len() < MIN_TRIP_SAMPLES {
            info!("Discarding short session ({} samples)", path.len());
            return None;
        }

        let trip = Trip::record(path, ended_at);
        info!(
            "Recorded trip {}: {:.2} km, {:.1} km/h, {} samples",
            trip.id,
            trip.distance,
            trip.avg_speed,
            trip.path.len()
        );
        Some(trip)
    }

    fn release_watch(&mut self) {
        if let Some(watch) = self.session.watch.take() {
            self.source.unsubscribe(watch.handle);
        }
    }
}

impl<S: LocationSource> Drop for Tracker<S> {
    fn drop(&mut self) {
        self.release_watch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LocationError, LocationErrorCode};
    use crate::location::FeedSource;
    use chrono::Utc;

    fn tracker() -> (Tracker<FeedSource>, FeedSource) {
        let source = FeedSource::new();
        (Tracker::new(source.clone(), WatchOptions::default()), source)
    }

    fn push_line(source: &FeedSource, n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| {
                let coord = Coordinate::new(55.0 + i as f64 * 0.0001, 12.0, i as i64 * 1000);
                source.push(coord);
                coord
            })
            .collect()
    }

    #[test]
    fn test_start_fails_without_capability() {
        let source = FeedSource::unavailable();
        let mut tracker = Tracker::new(source.clone(), WatchOptions::default());

        assert!(matches!(
            tracker.start(),
            Err(TrackingError::CapabilityUnavailable)
        ));
        assert!(!tracker.is_active());
        assert_eq!(source.subscribe_calls(), 0);
    }

    #[test]
    fn test_samples_accumulate_in_order() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();

        let pushed = push_line(&source, 4);
        assert_eq!(tracker.pump(), 4);
        assert_eq!(tracker.session().path(), pushed.as_slice());
        assert_eq!(tracker.current_position(), pushed.last());
    }

    #[test]
    fn test_sample_errors_do_not_stop_session() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();

        source.push(Coordinate::new(1.0, 1.0, 0));
        source.fail(LocationError::new(LocationErrorCode::PositionUnavailable, "lost fix"));
        source.push(Coordinate::new(1.0, 1.001, 1000));

        assert_eq!(tracker.pump(), 2);
        assert!(tracker.is_active());
        assert_eq!(source.active_watches(), 1);
    }

    #[test]
    fn test_stop_with_too_few_samples_discards_and_releases() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();
        push_line(&source, 2);

        assert!(tracker.stop_at(Utc::now()).is_none());
        assert!(!tracker.is_active());
        assert!(tracker.session().path().is_empty());
        assert_eq!(source.unsubscribe_calls(), 1);
        assert_eq!(source.active_watches(), 0);
    }

    #[test]
    fn test_stop_produces_trip_with_unmodified_path() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();
        // Left queued on purpose: stop drains pending samples.
        let pushed = push_line(&source, 3);

        let trip = tracker.stop_at(Utc::now()).unwrap();
        assert_eq!(trip.path, pushed);
        assert!(trip.summary.is_none());
        assert!(tracker.session().path().is_empty());
        assert_eq!(source.unsubscribe_calls(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut tracker, source) = tracker();
        assert!(tracker.stop().is_none());

        tracker.start().unwrap();
        tracker.stop();
        tracker.stop();
        assert_eq!(source.unsubscribe_calls(), 1);
    }

    #[test]
    fn test_restart_releases_previous_watch() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();
        push_line(&source, 5);
        tracker.pump();

        tracker.start().unwrap();
        assert_eq!(source.subscribe_calls(), 2);
        assert_eq!(source.unsubscribe_calls(), 1);
        assert_eq!(source.active_watches(), 1);
        assert!(tracker.session().path().is_empty());
    }

    #[test]
    fn test_samples_after_stop_are_ignored() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();
        tracker.stop();

        assert_eq!(source.push(Coordinate::new(0.0, 0.0, 0)), 0);
        assert!(!tracker.ingest(LocationEvent::Sample(Coordinate::new(0.0, 0.0, 0))));
        assert!(tracker.session().path().is_empty());
    }

    #[test]
    fn test_current_position_does_not_outlive_session() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();
        source.push(Coordinate::new(1.0, 1.0, 0));
        tracker.pump();
        assert!(tracker.current_position().is_some());

        tracker.stop();
        assert!(tracker.current_position().is_none());

        tracker.start().unwrap();
        assert!(tracker.current_position().is_none());
        assert!(tracker.session().path().is_empty());
    }

    #[test]
    fn test_restart_clears_current_position() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();
        source.push(Coordinate::new(2.0, 2.0, 0));
        tracker.pump();

        tracker.start().unwrap();
        assert!(tracker.current_position().is_none());
    }

    #[test]
    fn test_drop_releases_watch() {
        let source = FeedSource::new();
        {
            let mut tracker = Tracker::new(source.clone(), WatchOptions::default());
            tracker.start().unwrap();
            assert_eq!(source.active_watches(), 1);
        }
        assert_eq!(source.active_watches(), 0);
    }

    #[test]
    fn test_watch_options_are_forwarded() {
        let source = FeedSource::new();
        let mut tracker = Tracker::new(source.clone(), WatchOptions { high_accuracy: false });
        tracker.start().unwrap();
        assert_eq!(source.watch_options(), vec![WatchOptions { high_accuracy: false }]);
    }

    #[test]
    fn test_live_readouts() {
        let (mut tracker, source) = tracker();
        tracker.start().unwrap();
        source.push(Coordinate::new(0.0, 0.0, 0));
        source.push(Coordinate::new(0.001, 0.0, 1000).with_speed(5.0));
        tracker.pump();

        assert!((tracker.session().live_speed_kmh() - 18.0).abs() < 1e-9);
        assert!(tracker.session().distance_km() > 0.1);
    }

    #[tokio::test]
    async fn test_next_event_ingests_sample() {
        let (mut tracker, source) = tracker();
        assert!(tracker.next_event().await.is_none());

        tracker.start().unwrap();
        source.push(Coordinate::new(1.0, 2.0, 0));

        let event = tracker.next_event().await.unwrap();
        assert_eq!(event, LocationEvent::Sample(Coordinate::new(1.0, 2.0, 0)));
        assert_eq!(tracker.session().path().len(), 1);
    }
}
