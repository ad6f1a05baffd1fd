// Response body decoding
//
// The VSD answers single-object requests with either a bare object or a
// one-element array, and listings with an array. These helpers normalise
// both shapes before handing values to `Identifiable::absorb` / `decode`.

use serde_json::Value;

use crate::error::Error;

/// The single object carried by `body`, if any.
///
/// Arrays yield their first element; blank bodies and `null` yield `None`.
pub(crate) fn single(body: &str) -> Result<Option<Value>, Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    match parse(body)? {
        Value::Array(items) => Ok(items.into_iter().next()),
        Value::Null => Ok(None),
        other => Ok(Some(other)),
    }
}

/// Every object carried by `body`; a bare object counts as a list of one.
pub(crate) fn list(body: &str) -> Result<Vec<Value>, Error> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    match parse(body)? {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

/// Wrap a serde error with a preview of the offending body.
pub(crate) fn deserialization(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}

fn parse(body: &str) -> Result<Value, Error> {
    serde_json::from_str(body).map_err(|e| deserialization(&e, body))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn single_unwraps_one_element_array() {
        let value = single(r#"[{"ID":"e-1"}]"#).unwrap();
        assert_eq!(value, Some(json!({ "ID": "e-1" })));
    }

    #[test]
    fn single_accepts_bare_object() {
        let value = single(r#"{"ID":"e-1"}"#).unwrap();
        assert_eq!(value, Some(json!({ "ID": "e-1" })));
    }

    #[test]
    fn single_of_blank_or_empty_is_none() {
        assert_eq!(single("").unwrap(), None);
        assert_eq!(single("[]").unwrap(), None);
        assert_eq!(single("null").unwrap(), None);
    }

    #[test]
    fn list_wraps_bare_object() {
        assert_eq!(list(r#"{"ID":"e-1"}"#).unwrap().len(), 1);
        assert_eq!(list(r#"[{"ID":"a"},{"ID":"b"}]"#).unwrap().len(), 2);
        assert!(list("").unwrap().is_empty());
    }

    #[test]
    fn garbage_keeps_the_body() {
        match single("{not json") {
            Err(Error::Deserialization { body, message }) => {
                assert_eq!(body, "{not json");
                assert!(message.contains("body preview"));
            }
            other => panic!("expected Deserialization error, got: {other:?}"),
        }
    }
}
