// Resource capability traits
//
// The session never knows concrete resource types. It only needs a type's
// REST naming (`Identity`), an instance identifier, and, for the root
// object, a slot for the API key handed out at authentication.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// REST naming of a resource type.
///
/// `name` is the singular path segment used when the resource is the API
/// root (`/me`); `category` is the collection segment (`/enterprises`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub name: Cow<'static, str>,
    pub category: Cow<'static, str>,
}

impl Identity {
    /// Identity for a statically known resource type.
    pub const fn from_static(name: &'static str, category: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            category: Cow::Borrowed(category),
        }
    }

    /// Identity chosen at runtime (schema-less resources, CLI input).
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            category: Cow::Owned(category.into()),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.category)
    }
}

/// A resource addressable through the REST hierarchy.
///
/// Besides naming, implementors own their decode contract: the session
/// hands them the single JSON object the server returned and they decide
/// how it lands in `self`. The defaults cover plain serde types.
pub trait Identifiable: Serialize + DeserializeOwned + Send + Sync {
    /// REST naming of this resource's type.
    fn identity(&self) -> Identity;

    /// Server-assigned identifier. Empty until the resource is created.
    fn identifier(&self) -> &str;

    /// Merge a server response into this value.
    ///
    /// Default: overlay the returned fields on the current JSON encoding,
    /// so anything the server left out keeps its local value.
    fn absorb(&mut self, response: Value) -> Result<(), serde_json::Error> {
        let mut current = serde_json::to_value(&*self)?;
        overlay(&mut current, response);
        *self = serde_json::from_value(current)?;
        Ok(())
    }

    /// Build one element of a children listing.
    ///
    /// `identity` is the identity that was requested, for types that carry
    /// it at runtime instead of statically.
    fn decode(identity: &Identity, value: Value) -> Result<Self, serde_json::Error> {
        let _ = identity;
        serde_json::from_value(value)
    }
}

/// The API root: the object authentication is performed against.
///
/// Fetching it returns the caller's API key, which then replaces the
/// password for the rest of the session.
pub trait Rootable: Identifiable {
    fn api_key(&self) -> &str;
    fn set_api_key(&mut self, key: String);
}

/// Overlay `patch` on `target`: object keys are replaced one by one,
/// anything else replaces `target` wholesale.
pub(crate) fn overlay(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}
