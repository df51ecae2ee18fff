//! Event tracker.
//!
//! The [`Tracker`] resolves a handler for each event by its tag, enriches the
//! payload with the acting user's identity and hands the result to the
//! handler. One tracker exists per [`crate::AppContext`]; see
//! [`crate::context::install`].

pub mod events;
pub mod handlers;
pub mod registry;

pub use events::{EventData, EventType, RESERVED_KEYS};
pub use handlers::{ForwardHandler, LogHandler};
pub use registry::{EventHandler, HandlerRef, HandlerRegistry};

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EaselError, Result};

/// Identity attached to every tracked event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub uid: String,
}

/// Plugin configuration supplied at install time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackConfig {
    pub user_info: UserInfo,
}

/// An event merged with the user identity. Serialises as one flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
    #[serde(flatten)]
    pub data: EventData,
    #[serde(flatten)]
    pub user: UserInfo,
}

impl TrackedEvent {
    pub fn event_type(&self) -> EventType {
        self.data.event_type()
    }
}

pub struct Tracker {
    /// Handler used by the most recent `track` call, or set via `set_event`.
    current_event: Mutex<Option<HandlerRef>>,
    events: HandlerRegistry,
    user_info: UserInfo,
}

impl Tracker {
    pub fn new(config: TrackConfig, events: HandlerRegistry) -> Self {
        Self {
            current_event: Mutex::new(None),
            events,
            user_info: config.user_info,
        }
    }

    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    pub fn events(&self) -> &HandlerRegistry {
        &self.events
    }

    pub fn current_event(&self) -> Option<HandlerRef> {
        self.current_event.lock().clone()
    }

    pub fn set_event(&self, strategy: HandlerRef) {
        *self.current_event.lock() = Some(strategy);
    }

    /// Copy of `data` merged with this tracker's user identity. Reserved keys
    /// in `data`'s extras are dropped so the identity cannot be shadowed.
    pub fn data_with_user_info(&self, data: &EventData) -> TrackedEvent {
        TrackedEvent {
            data: data.clone().sanitized(),
            user: self.user_info.clone(),
        }
    }

    /// Dispatch `data` to the handler bound to its event type.
    ///
    /// # Errors
    /// `EaselError::UnboundHandler` if no handler is bound for the tag.
    pub fn track(&self, data: &EventData) -> Result<()> {
        let event_type = data.event_type();
        let handler = self
            .events
            .get(event_type)
            .cloned()
            .ok_or(EaselError::UnboundHandler(event_type))?;

        self.set_event(Arc::clone(&handler));
        let enriched = self.data_with_user_info(data);
        debug!(event_type = %event_type, uid = %self.user_info.uid, "tracking event");
        handler.handle(&enriched);
        Ok(())
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("events", &self.events)
            .field("user_info", &self.user_info)
            .finish_non_exhaustive()
    }
}
