//! Shared helpers for command handlers.

use serde_json::Value;

use bambou::{DynamicEntity, Identity};

use crate::cli::ObjectRef;
use crate::error::CliError;

/// Identity for a category given on the command line.
///
/// The CLI only knows REST categories, so the category doubles as the
/// resource name. `me` therefore matches the session root.
pub fn identity(category: &str) -> Identity {
    Identity::new(category, category)
}

/// A local stand-in for the object `r` refers to.
pub fn entity(r: &ObjectRef) -> DynamicEntity {
    let entity = DynamicEntity::new(identity(&r.category));
    match r.id {
        Some(ref id) => entity.with_id(id.clone()),
        None => entity,
    }
}

/// Parse `--data`: inline JSON, or `@path` to read it from a file.
pub fn read_data(data: &str) -> Result<Value, CliError> {
    let contents = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => data.to_owned(),
    };

    let value: Value = serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "data".into(),
        reason: format!("invalid JSON: {e}"),
    })?;

    if !value.is_object() {
        return Err(CliError::Validation {
            field: "data".into(),
            reason: "expected a JSON object".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use bambou::Identifiable;
    use serde_json::json;

    use super::*;
    use crate::cli::parse_object_ref;

    #[test]
    fn entity_carries_category_and_id() {
        let ent = entity(&parse_object_ref("enterprises/e-1").unwrap());
        assert_eq!(ent.identity(), Identity::new("enterprises", "enterprises"));
        assert_eq!(ent.identifier(), "e-1");
    }

    #[test]
    fn root_reference_has_root_identity() {
        let ent = entity(&parse_object_ref("me").unwrap());
        assert_eq!(ent.identity(), Identity::new("me", "me"));
        assert_eq!(ent.identifier(), "");
    }

    #[test]
    fn inline_data_must_be_object() {
        assert_eq!(read_data(r#"{"name":"web"}"#).unwrap(), json!({ "name": "web" }));
        assert!(read_data("[1]").is_err());
        assert!(read_data("nope").is_err());
    }

    #[test]
    fn data_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domain.json");
        std::fs::write(&path, r#"{"name":"web"}"#).unwrap();

        let value = read_data(&format!("@{}", path.display())).unwrap();
        assert_eq!(value["name"], "web");
    }
}
