use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{EventSender, LocationEvent, LocationSource, WatchHandle, WatchOptions};
use crate::error::LocationError;
use crate::models::Coordinate;

#[derive(Debug, Default)]
struct FeedState {
    available: bool,
    next_handle: u64,
    watches: HashMap<WatchHandle, (WatchOptions, EventSender)>,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
}

/// A location source driven from outside: platform callbacks, a replayed
/// track or a test push fixes into it and it fans them out to open watches.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct FeedSource {
    state: Arc<Mutex<FeedState>>,
}

impl Default for FeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedSource {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState {
                available: true,
                ..FeedState::default()
            })),
        }
    }

    /// A source reporting that location sensing is not supported.
    pub fn unavailable() -> Self {
        let source = Self::new();
        source.state().available = false;
        source
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers a fix to every open watch. Returns the number of receivers.
    pub fn push(&self, coord: Coordinate) -> usize {
        self.broadcast(LocationEvent::Sample(coord))
    }

    /// Reports a sensor error to every open watch.
    pub fn fail(&self, error: LocationError) -> usize {
        self.broadcast(LocationEvent::Error(error))
    }

    fn broadcast(&self, event: LocationEvent) -> usize {
        let mut state = self.state();
        // Drop watches whose receiver went away.
        state
            .watches
            .retain(|_, (_, tx)| tx.send(event.clone()).is_ok());
        state.watches.len()
    }

    pub fn active_watches(&self) -> usize {
        self.state().watches.len()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.state().subscribe_calls
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.state().unsubscribe_calls
    }

    pub fn watch_options(&self) -> Vec<WatchOptions> {
        self.state().watches.values().map(|(o, _)| *o).collect()
    }
}

impl LocationSource for FeedSource {
    fn is_available(&self) -> bool {
        self.state().available
    }

    fn subscribe(
        &self,
        options: WatchOptions,
        events: EventSender,
    ) -> Result<WatchHandle, LocationError> {
        let mut state = self.state();
        state.subscribe_calls += 1;
        state.next_handle += 1;
        let handle = WatchHandle(state.next_handle);
        state.watches.insert(handle, (options, events));
        debug!("Opened watch {:?} (high accuracy: {})", handle, options.high_accuracy);
        Ok(handle)
    }

    fn unsubscribe(&self, handle: WatchHandle) {
        let mut state = self.state();
        state.unsubscribe_calls += 1;
        if state.watches.remove(&handle).is_some() {
            debug!("Released watch {:?}", handle);
        }
    }
}
