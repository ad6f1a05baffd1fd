// Push notification payloads returned by `GET /events`.

use serde::{Deserialize, Serialize};

/// One change record pushed by the VSD.
///
/// Uses `#[serde(flatten)]` to keep every field beyond the core set, so
/// nothing the server sends is dropped on the way to handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Resource name of the changed object, e.g. `"enterprise"`.
    #[serde(default)]
    pub entity_type: String,

    /// `"CREATE"`, `"UPDATE"`, `"DELETE"`, ...
    #[serde(default, rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub update_mechanism: String,

    /// Full JSON representation of the affected objects.
    #[serde(default)]
    pub entities: Vec<serde_json::Value>,

    /// All remaining fields the VSD sends.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A batch of events. Its `uuid` is the cursor for the next long-poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub events: Vec<Event>,

    #[serde(default)]
    pub uuid: String,
}

impl Notification {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn deserialize_notification() {
        let json = r#"{
            "uuid": "0f2e4d0a-6c2a-4c61-9c2e-1f0b5f1a0001",
            "events": [{
                "entityType": "enterprise",
                "type": "CREATE",
                "updateMechanism": "DEFAULT",
                "entities": [{ "ID": "e-1", "name": "acme" }],
                "eventReceivedTime": 1700000000000
            }]
        }"#;

        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.uuid, "0f2e4d0a-6c2a-4c61-9c2e-1f0b5f1a0001");
        assert_eq!(n.events.len(), 1);

        let event = &n.events[0];
        assert_eq!(event.entity_type, "enterprise");
        assert_eq!(event.event_type, "CREATE");
        assert_eq!(event.update_mechanism, "DEFAULT");
        assert_eq!(event.entities[0]["name"], "acme");
        assert_eq!(event.extra["eventReceivedTime"], 1_700_000_000_000_u64);
    }

    #[test]
    fn empty_body_fields_default() {
        let n: Notification = serde_json::from_str("{}").unwrap();
        assert!(n.is_empty());
        assert_eq!(n.uuid, "");
    }
}
