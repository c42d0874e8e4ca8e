//! Position sources feeding the tracker.
//!
//! A source pushes [`LocationEvent`]s into the channel handed to
//! [`LocationSource::subscribe`] until the watch is released.

mod feed;

pub use feed::FeedSource;

use tokio::sync::mpsc;

use crate::error::LocationError;
use crate::models::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Prefer higher-precision, higher-power sensing.
    pub high_accuracy: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
        }
    }
}

/// Identifies one open subscription on a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Sample(Coordinate),
    Error(LocationError),
}

pub type EventSender = mpsc::UnboundedSender<LocationEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<LocationEvent>;

pub trait LocationSource: Send + Sync {
    /// Whether location sensing is supported at all.
    fn is_available(&self) -> bool;

    /// Opens a continuous watch delivering events into `events`.
    fn subscribe(
        &self,
        options: WatchOptions,
        events: EventSender,
    ) -> Result<WatchHandle, LocationError>;

    /// Releases a watch. Unknown handles are ignored.
    fn unsubscribe(&self, handle: WatchHandle);
}
