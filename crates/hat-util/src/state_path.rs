//! Typed paths into a JSON state tree.
//!
//! Unlike JSON Pointer paths, a [`StatePath`] knows whether a step addresses an
//! object member or an array element, so writes through a missing branch can
//! create the right kind of container on the way down.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Most `null`s a single write may pad an array with.
pub const MAX_PADDING: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatePathError {
    #[error("index {index} is too far past the end of an array of length {len}")]
    IndexTooFar { index: usize, len: usize },
}

/// One step of a [`StatePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

pub type StatePath = Vec<Segment>;

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Builds a [`StatePath`] from anything convertible into segments.
///
/// ```
/// use hat_util::state_path::{path, Segment};
///
/// assert_eq!(path(["items"]), vec![Segment::Key("items".into())]);
/// ```
pub fn path<I, S>(segments: I) -> StatePath
where
    I: IntoIterator<Item = S>,
    S: Into<Segment>,
{
    segments.into_iter().map(Into::into).collect()
}

/// Returns the value at `path`, or `None` if any step is missing or has the
/// wrong container kind.
pub fn get<'a>(x: &'a Value, path: &[Segment]) -> Option<&'a Value> {
    let mut current = x;
    for segment in path {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Index(index), Value::Array(arr)) => arr.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replaces the value at `path` with `f(old)`.
///
/// `old` is `Value::Null` when the location does not exist yet. Missing or
/// mistyped containers along the way are replaced by an empty object (for a
/// key step) or an array padded with `null` (for an index step). An index
/// more than [`MAX_PADDING`] past the end of its array is an error, and `x`
/// is left with only the containers created before that step.
pub fn change<F>(x: &mut Value, path: &[Segment], f: F) -> Result<(), StatePathError>
where
    F: FnOnce(Value) -> Value,
{
    let slot = slot_mut(x, path)?;
    let old = std::mem::take(slot);
    *slot = f(old);
    Ok(())
}

/// Sets the value at `path`, creating containers as [`change`] does.
pub fn set(x: &mut Value, path: &[Segment], value: Value) -> Result<(), StatePathError> {
    *slot_mut(x, path)? = value;
    Ok(())
}

fn slot_mut<'a>(x: &'a mut Value, path: &[Segment]) -> Result<&'a mut Value, StatePathError> {
    let mut current = x;
    for segment in path {
        current = match segment {
            Segment::Key(key) => {
                if !current.is_object() {
                    *current = Value::Object(Map::new());
                }
                match current {
                    Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                    _ => unreachable!("container was just created"),
                }
            }
            Segment::Index(index) => {
                if !current.is_array() {
                    *current = Value::Array(Vec::new());
                }
                match current {
                    Value::Array(arr) => {
                        let len = arr.len();
                        if len <= *index {
                            if *index - len >= MAX_PADDING {
                                return Err(StatePathError::IndexTooFar { index: *index, len });
                            }
                            arr.resize(index + 1, Value::Null);
                        }
                        &mut arr[*index]
                    }
                    _ => unreachable!("container was just created"),
                }
            }
        };
    }
    Ok(current)
}
