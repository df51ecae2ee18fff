//! Tracked event payloads.
//!
//! Events serialise as a flat JSON object tagged by `eventType`:
//!
//! | Tag | Fields |
//! |-----|--------|
//! | `ROUTE_CHANGE` | `route`, `enteredFrom`, `exceptions?` |
//! | `BUTTON_CLICK` | `eventName`, plus any extra keys |
//!
//! Extra keys never shadow the tag, the event name or the user identity merged
//! in by the tracker; see [`RESERVED_KEYS`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Closed set of event tags. Every tag needs a bound handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    RouteChange,
    ButtonClick,
}

impl EventType {
    pub const ALL: [EventType; 2] = [EventType::RouteChange, EventType::ButtonClick];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::RouteChange => "ROUTE_CHANGE",
            EventType::ButtonClick => "BUTTON_CLICK",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys owned by the event envelope. Dropped from `BUTTON_CLICK` extras.
pub const RESERVED_KEYS: [&str; 5] = ["eventType", "eventName", "name", "email", "uid"];

/// A single UI event, before user enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(from = "WireEventData")]
pub enum EventData {
    #[serde(rename_all = "camelCase")]
    RouteChange {
        route: String,
        entered_from: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exceptions: Option<Vec<String>>,
    },
    #[serde(rename_all = "camelCase")]
    ButtonClick {
        event_name: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl EventData {
    pub fn route_change(route: impl Into<String>, entered_from: impl Into<String>) -> Self {
        EventData::RouteChange {
            route: route.into(),
            entered_from: entered_from.into(),
            exceptions: None,
        }
    }

    pub fn button_click(event_name: impl Into<String>) -> Self {
        EventData::ButtonClick {
            event_name: event_name.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra field to a `BUTTON_CLICK` event. Ignored for other
    /// tags and for [`RESERVED_KEYS`].
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if is_reserved(&key) {
            debug!(%key, "ignoring reserved event field");
            return self;
        }
        if let EventData::ButtonClick { extra, .. } = &mut self {
            extra.insert(key, value.into());
        }
        self
    }

    /// Copy without any reserved keys in `BUTTON_CLICK` extras.
    pub fn sanitized(mut self) -> Self {
        if let EventData::ButtonClick { extra, .. } = &mut self {
            extra.retain(|key, _| !is_reserved(key));
        }
        self
    }

    pub fn event_type(&self) -> EventType {
        match self {
            EventData::RouteChange { .. } => EventType::RouteChange,
            EventData::ButtonClick { .. } => EventType::ButtonClick,
        }
    }
}

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Incoming shape of [`EventData`]; reserved extras are stripped on conversion.
#[derive(Deserialize)]
#[serde(tag = "eventType", rename_all = "SCREAMING_SNAKE_CASE")]
enum WireEventData {
    #[serde(rename_all = "camelCase")]
    RouteChange {
        route: String,
        entered_from: String,
        #[serde(default)]
        exceptions: Option<Vec<String>>,
    },
    #[serde(rename_all = "camelCase")]
    ButtonClick {
        event_name: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl From<WireEventData> for EventData {
    fn from(wire: WireEventData) -> Self {
        match wire {
            WireEventData::RouteChange {
                route,
                entered_from,
                exceptions,
            } => EventData::RouteChange {
                route,
                entered_from,
                exceptions,
            },
            WireEventData::ButtonClick { event_name, extra } => {
                EventData::ButtonClick { event_name, extra }.sanitized()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn button_click_serializes_flat_with_extra_fields() {
        let event = EventData::button_click("save").with_field("tool", "brush");

        let json = serde_json::to_value(&event).expect("serialize button click");
        assert_eq!(
            json,
            json!({"eventType": "BUTTON_CLICK", "eventName": "save", "tool": "brush"})
        );
    }

    #[test]
    fn route_change_parses_from_camel_case() {
        let raw = json!({
            "eventType": "ROUTE_CHANGE",
            "route": "/new-canvas",
            "enteredFrom": "/",
        });

        let event: EventData = serde_json::from_value(raw).expect("parse route change");
        assert_eq!(event.event_type(), EventType::RouteChange);
        assert_eq!(event, EventData::route_change("/new-canvas", "/"));
    }

    #[test]
    fn reserved_keys_cannot_shadow_the_envelope() {
        let event = EventData::button_click("save")
            .with_field("eventType", "ROUTE_CHANGE")
            .with_field("eventName", "other")
            .with_field("uid", "intruder")
            .with_field("tool", "brush");

        let json = serde_json::to_string(&event).expect("serialize");
        let parsed: Value = serde_json::from_str(&json).expect("parse json");
        assert_eq!(parsed["eventType"], event.event_type().as_str());
        assert_eq!(parsed["eventName"], "save");
        assert!(parsed.get("uid").is_none());
        assert_eq!(parsed["tool"], "brush");

        let back: EventData = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, event);
    }

    #[test]
    fn reserved_extras_are_stripped_when_parsing() {
        let raw = json!({
            "eventType": "BUTTON_CLICK",
            "eventName": "save",
            "email": "spoof@x.com",
            "tool": "brush",
        });

        let event: EventData = serde_json::from_value(raw).expect("parse button click");
        assert_eq!(event, EventData::button_click("save").with_field("tool", "brush"));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let raw = json!({"eventType": "SCROLL", "eventName": "x"});
        assert!(serde_json::from_value::<EventData>(raw).is_err());
    }

    #[test]
    fn event_type_display_matches_wire_tag() {
        for tag in EventType::ALL {
            let wire = serde_json::to_value(tag).expect("serialize tag");
            assert_eq!(wire, Value::String(tag.to_string()));
        }
    }
}
