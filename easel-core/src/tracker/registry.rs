//! Event-type → handler mapping.
//!
//! One slot per [`EventType`] variant, resolved by exhaustive `match`, so
//! adding a tag fails to compile until the registry learns about it.

use std::sync::Arc;

use super::{EventType, TrackedEvent};

/// Strategy invoked for every tracked event of its bound type.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &TrackedEvent);
}

pub type HandlerRef = Arc<dyn EventHandler>;

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    route_change: Option<HandlerRef>,
    button_click: Option<HandlerRef>,
}

impl HandlerRegistry {
    /// Empty registry. Must be completed before use with a [`super::Tracker`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the same handler bound to every event type.
    pub fn uniform(handler: HandlerRef) -> Self {
        let mut registry = Self::new();
        for event_type in EventType::ALL {
            registry.bind(event_type, Arc::clone(&handler));
        }
        registry
    }

    pub fn with(mut self, event_type: EventType, handler: HandlerRef) -> Self {
        self.bind(event_type, handler);
        self
    }

    /// Bind `handler` to `event_type`, replacing any previous binding.
    pub fn bind(&mut self, event_type: EventType, handler: HandlerRef) {
        *self.slot_mut(event_type) = Some(handler);
    }

    pub fn get(&self, event_type: EventType) -> Option<&HandlerRef> {
        match event_type {
            EventType::RouteChange => self.route_change.as_ref(),
            EventType::ButtonClick => self.button_click.as_ref(),
        }
    }

    /// Event types with no bound handler.
    pub fn missing(&self) -> Vec<EventType> {
        EventType::ALL
            .into_iter()
            .filter(|t| self.get(*t).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    fn slot_mut(&mut self, event_type: EventType) -> &mut Option<HandlerRef> {
        match event_type {
            EventType::RouteChange => &mut self.route_change,
            EventType::ButtonClick => &mut self.button_click,
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("route_change", &self.route_change.is_some())
            .field("button_click", &self.button_click.is_some())
            .finish()
    }
}
