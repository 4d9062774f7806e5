//! JSON Pointer (RFC 6901) utilities.
//!
//! A pointer is kept in its decoded form, a [`Path`] of unescaped segments.
//! [`find`] and [`find_mut`] resolve a path to the container that holds the
//! addressed location, which is what JSON Patch operations need in order to
//! insert, delete or overwrite at that location.
//!
//! # Example
//!
//! ```
//! use hat_json_pointer::{parse_json_pointer, format_json_pointer, get};
//!
//! let path = parse_json_pointer("/foo/bar");
//! assert_eq!(path, vec!["foo".to_string(), "bar".to_string()]);
//! assert_eq!(format_json_pointer(&path), "/foo/bar");
//!
//! let doc = serde_json::json!({"foo": {"bar": 42}});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!(42)));
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod find;
pub mod types;
pub mod validate;

pub use find::{find, find_mut, Found, FoundMut};
pub use types::{Key, Path, PathStep};
pub use validate::{validate_json_pointer, validate_path};

/// Unescapes a JSON Pointer path component.
///
/// `~1` is replaced with `/` first, then `~0` with `~`.
///
/// ```
/// use hat_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// ```
/// use hat_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parses a JSON Pointer string into path components.
///
/// The empty pointer is the document root. A leading `/` is optional.
///
/// ```
/// use hat_json_pointer::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer(""), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/"), vec![""]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d"), vec!["a~b", "c/d"]);
/// ```
pub fn parse_json_pointer(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    let rest = pointer.strip_prefix('/').unwrap_or(pointer);
    rest.split('/').map(unescape_component).collect()
}

/// Formats path components into a JSON Pointer string.
///
/// ```
/// use hat_json_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["a/b".to_string(), "0".to_string()]), "/a~1b/0");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Returns `true` if `parent` is a strict prefix of `child`.
///
/// ```
/// use hat_json_pointer::is_child;
///
/// let parent = vec!["foo".to_string()];
/// let child = vec!["foo".to_string(), "bar".to_string()];
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// assert!(!is_child(&parent, &parent));
/// ```
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == *parent
}

/// Returns `true` if one path is a prefix of the other (or they are equal).
pub fn overlaps(a: &[String], b: &[String]) -> bool {
    let n = a.len().min(b.len());
    a[..n] == b[..n]
}

/// Returns the parent path.
///
/// ```
/// use hat_json_pointer::parent;
///
/// assert_eq!(parent(&["a".to_string(), "b".to_string()]).unwrap(), vec!["a"]);
/// assert!(parent(&[]).is_err());
/// ```
pub fn parent(path: &[String]) -> Result<Path, JsonPointerError> {
    match path.split_last() {
        Some((_, init)) => Ok(init.to_vec()),
        None => Err(JsonPointerError::NoParent),
    }
}

/// Checks whether a segment is a canonical array index: `0` or a decimal
/// number without leading zeros.
///
/// ```
/// use hat_json_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-"));
/// assert!(!is_valid_index("1.5"));
/// ```
pub fn is_valid_index(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    match bytes {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        _ => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// Parses a canonical array index.
pub fn parse_array_index(segment: &str) -> Result<usize, JsonPointerError> {
    if !is_valid_index(segment) {
        return Err(JsonPointerError::InvalidIndex(segment.to_string()));
    }
    segment
        .parse()
        .map_err(|_| JsonPointerError::InvalidIndex(segment.to_string()))
}

/// Gets a value from a JSON document by path.
///
/// Returns `None` if the path doesn't exist, crosses a scalar, or uses a
/// non-index segment at an array level.
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => arr.get(parse_array_index(step).ok()?)?,
            Value::Object(map) => map.get(step)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get`].
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => arr.get_mut(parse_array_index(step).ok()?)?,
            Value::Object(map) => map.get_mut(step)?,
            _ => return None,
        };
    }
    Some(current)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("invalid array index: {0:?}")]
    InvalidIndex(String),
    #[error("path has no parent")]
    NoParent,
    #[error("invalid JSON pointer: {0}")]
    Invalid(String),
}
