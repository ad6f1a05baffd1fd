// Schema-less resources
//
// Generated API types know their identity statically. These two types pick
// it at runtime and keep every attribute as raw JSON, which is all a
// generic tool (the CLI, a test, a quick script) needs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::{Identifiable, Identity, Rootable, overlay};

const ID_KEY: &str = "ID";
const API_KEY_KEY: &str = "APIKey";

fn unknown_identity() -> Identity {
    Identity::from_static("", "")
}

fn root_identity() -> Identity {
    Identity::from_static("me", "me")
}

fn str_attr<'a>(attributes: &'a Map<String, Value>, key: &str) -> &'a str {
    attributes.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Any resource, attributes kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicEntity {
    #[serde(skip, default = "unknown_identity")]
    identity: Identity,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DynamicEntity {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            attributes: Map::new(),
        }
    }

    /// Build from a JSON object; non-objects yield an empty entity.
    pub fn from_value(identity: Identity, value: Value) -> Self {
        let attributes = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            identity,
            attributes,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.attributes.insert(ID_KEY.into(), Value::String(id.into()));
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

impl Identifiable for DynamicEntity {
    fn identity(&self) -> Identity {
        self.identity.clone()
    }

    fn identifier(&self) -> &str {
        str_attr(&self.attributes, ID_KEY)
    }

    fn absorb(&mut self, response: Value) -> Result<(), serde_json::Error> {
        absorb_map(&mut self.attributes, response)
    }

    fn decode(identity: &Identity, value: Value) -> Result<Self, serde_json::Error> {
        let mut entity = Self::new(identity.clone());
        entity.absorb(value)?;
        Ok(entity)
    }
}

/// The API root (`/me` by default) with its `APIKey` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicRoot {
    #[serde(skip, default = "root_identity")]
    identity: Identity,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DynamicRoot {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            attributes: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.attributes.insert(ID_KEY.into(), Value::String(id.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

impl Default for DynamicRoot {
    fn default() -> Self {
        Self::new(root_identity())
    }
}

impl Identifiable for DynamicRoot {
    fn identity(&self) -> Identity {
        self.identity.clone()
    }

    fn identifier(&self) -> &str {
        str_attr(&self.attributes, ID_KEY)
    }

    fn absorb(&mut self, response: Value) -> Result<(), serde_json::Error> {
        absorb_map(&mut self.attributes, response)
    }
}

impl Rootable for DynamicRoot {
    fn api_key(&self) -> &str {
        str_attr(&self.attributes, API_KEY_KEY)
    }

    fn set_api_key(&mut self, key: String) {
        self.attributes.insert(API_KEY_KEY.into(), Value::String(key));
    }
}

fn absorb_map(attributes: &mut Map<String, Value>, response: Value) -> Result<(), serde_json::Error> {
    if !response.is_object() {
        return Err(serde::de::Error::custom(format!(
            "expected a JSON object, got {response}"
        )));
    }

    let mut current = Value::Object(std::mem::take(attributes));
    overlay(&mut current, response);
    if let Value::Object(map) = current {
        *attributes = map;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn identifier_reads_id_attribute() {
        let ent = DynamicEntity::new(Identity::new("enterprise", "enterprises")).with_id("e-1");
        assert_eq!(ent.identifier(), "e-1");
        assert_eq!(DynamicEntity::new(Identity::new("a", "as")).identifier(), "");
    }

    #[test]
    fn serialization_skips_identity() {
        let mut ent = DynamicEntity::new(Identity::new("enterprise", "enterprises")).with_id("e-1");
        ent.set("name", "acme");

        assert_eq!(
            serde_json::to_value(&ent).unwrap(),
            json!({ "ID": "e-1", "name": "acme" })
        );
    }

    #[test]
    fn absorb_keeps_identity_and_local_fields() {
        let mut ent = DynamicEntity::new(Identity::new("enterprise", "enterprises"));
        ent.set("name", "acme");
        ent.set("description", "local");

        ent.absorb(json!({ "ID": "e-1", "name": "ACME" })).unwrap();

        assert_eq!(ent.identity(), Identity::new("enterprise", "enterprises"));
        assert_eq!(ent.identifier(), "e-1");
        assert_eq!(ent.get("name"), Some(&json!("ACME")));
        assert_eq!(ent.get("description"), Some(&json!("local")));
    }

    #[test]
    fn absorb_rejects_non_objects() {
        let mut ent = DynamicEntity::new(Identity::new("enterprise", "enterprises"));
        assert!(ent.absorb(json!([1, 2])).is_err());
    }

    #[test]
    fn decode_attaches_requested_identity() {
        let identity = Identity::new("domain", "domains");
        let ent = DynamicEntity::decode(&identity, json!({ "ID": "d-1" })).unwrap();
        assert_eq!(ent.identity(), identity);
        assert_eq!(ent.identifier(), "d-1");
    }

    #[test]
    fn root_api_key_round_trip() {
        let mut root = DynamicRoot::default();
        assert_eq!(root.identity(), Identity::new("me", "me"));
        assert_eq!(root.api_key(), "");

        root.set_api_key("02a0b1c2".into());
        assert_eq!(root.api_key(), "02a0b1c2");

        root.set_api_key(String::new());
        assert_eq!(root.api_key(), "");
    }
}
