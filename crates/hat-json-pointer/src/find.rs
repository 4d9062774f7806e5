//! Resolving a path to the container that holds the addressed location.

use serde_json::Value;

use crate::types::Key;
use crate::{parse_array_index, JsonPointerError};

/// Result of [`find`]: the container of the addressed location and the key
/// inside it. For the root path the container is the document itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Found<'a> {
    pub container: &'a Value,
    pub key: Key,
}

impl<'a> Found<'a> {
    /// The value currently stored at the location, if any.
    pub fn value(&self) -> Option<&'a Value> {
        lookup(self.container, &self.key)
    }
}

/// Result of [`find_mut`].
#[derive(Debug)]
pub struct FoundMut<'a> {
    pub container: &'a mut Value,
    pub key: Key,
}

impl FoundMut<'_> {
    pub fn value(&self) -> Option<&Value> {
        lookup(self.container, &self.key)
    }

    pub fn value_mut(&mut self) -> Option<&mut Value> {
        match (&self.key, &mut *self.container) {
            (Key::Root, doc) => Some(doc),
            (Key::Member(key), Value::Object(map)) => map.get_mut(key),
            (Key::Index(index), Value::Array(arr)) => arr.get_mut(*index),
            _ => None,
        }
    }
}

fn lookup<'a>(container: &'a Value, key: &Key) -> Option<&'a Value> {
    match (key, container) {
        (Key::Root, doc) => Some(doc),
        (Key::Member(key), Value::Object(map)) => map.get(key),
        (Key::Index(index), Value::Array(arr)) => arr.get(*index),
        _ => None,
    }
}

/// Classifies `step` against `container`. `Ok(None)` when the container is
/// null, so nothing below it can exist.
fn resolve_key(container: &Value, step: &str) -> Result<Option<Key>, JsonPointerError> {
    match container {
        Value::Null => Ok(None),
        Value::Array(_) if step == "-" => Ok(Some(Key::Append)),
        Value::Array(_) => Ok(Some(Key::Index(parse_array_index(step)?))),
        _ => Ok(Some(Key::Member(step.to_string()))),
    }
}

/// Finds the container and key addressed by `path`.
///
/// Returns `Ok(None)` when an intermediate location is missing or null. The
/// last segment only has to be classifiable: an out-of-range index or an
/// absent member still yields a result whose [`Found::value`] is `None`.
///
/// # Errors
///
/// [`JsonPointerError::InvalidIndex`] when a segment at an array level is
/// neither a canonical index nor `-`.
///
/// # Example
///
/// ```
/// use hat_json_pointer::{find, parse_json_pointer, Key};
/// use serde_json::json;
///
/// let doc = json!({"a": [1, 2]});
/// let found = find(&doc, &parse_json_pointer("/a/2")).unwrap().unwrap();
/// assert_eq!(found.key, Key::Index(2));
/// assert_eq!(found.value(), None);
///
/// assert!(find(&doc, &parse_json_pointer("/b/c")).unwrap().is_none());
/// ```
pub fn find<'a>(doc: &'a Value, path: &[String]) -> Result<Option<Found<'a>>, JsonPointerError> {
    let Some((last, init)) = path.split_last() else {
        return Ok(Some(Found { container: doc, key: Key::Root }));
    };
    let mut current = doc;
    for step in init {
        let Some(key) = resolve_key(current, step)? else {
            return Ok(None);
        };
        current = match lookup(current, &key) {
            Some(child) => child,
            None => return Ok(None),
        };
    }
    Ok(resolve_key(current, last)?.map(|key| Found { container: current, key }))
}

/// Mutable counterpart of [`find`].
pub fn find_mut<'a>(
    doc: &'a mut Value,
    path: &[String],
) -> Result<Option<FoundMut<'a>>, JsonPointerError> {
    let Some((last, init)) = path.split_last() else {
        return Ok(Some(FoundMut { container: doc, key: Key::Root }));
    };
    let mut current = doc;
    for step in init {
        let Some(key) = resolve_key(current, step)? else {
            return Ok(None);
        };
        let child = match (key, current) {
            (Key::Member(key), Value::Object(map)) => map.get_mut(&key),
            (Key::Index(index), Value::Array(arr)) => arr.get_mut(index),
            _ => None,
        };
        current = match child {
            Some(child) => child,
            None => return Ok(None),
        };
    }
    Ok(resolve_key(current, last)?.map(|key| FoundMut { container: current, key }))
}
