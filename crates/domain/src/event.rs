//! Event: an immutable record of something that happened.
//!
//! Produced when devices are registered, entities are created and entity
//! state changes.

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// Kind of [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DeviceRegistered,
    EntityCreated,
    StateChanged,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceRegistered => f.write_str("device_registered"),
            Self::EntityCreated => f.write_str("entity_created"),
            Self::StateChanged => f.write_str("state_changed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<EntityId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_assign_fresh_id_to_each_event() {
        let a = Event::new(EventType::StateChanged, None, serde_json::json!({}));
        let b = Event::new(EventType::StateChanged, None, serde_json::json!({}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_serialize_event_type_as_snake_case() {
        let json = serde_json::to_string(&EventType::StateChanged).unwrap();
        assert_eq!(json, "\"state_changed\"");
    }
}
