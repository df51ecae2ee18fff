//! Built-in event handlers.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::info;

use super::{EventHandler, TrackedEvent};

/// Broadcast channel capacity for forwarded events.
const FORWARD_CAP: usize = 256;

/// Writes one structured log record per tracked event.
#[derive(Debug, Default)]
pub struct LogHandler;

impl EventHandler for LogHandler {
    fn handle(&self, event: &TrackedEvent) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        info!(
            event_type = %event.event_type(),
            uid = %event.user.uid,
            %payload,
            "tracked event"
        );
    }
}

/// Re-publishes tracked events on a broadcast channel.
///
/// Non-blocking: slow receivers lag rather than stall `track`.
pub struct ForwardHandler {
    tx: broadcast::Sender<TrackedEvent>,
    forwarded: AtomicU64,
}

impl ForwardHandler {
    pub fn new() -> Self {
        Self::with_capacity(FORWARD_CAP)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            forwarded: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackedEvent> {
        self.tx.subscribe()
    }

    /// Total events handled, including those sent while nobody listened.
    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }
}

impl Default for ForwardHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for ForwardHandler {
    fn handle(&self, event: &TrackedEvent) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(event.clone());
    }
}
