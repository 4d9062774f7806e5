//! Type definitions for JSON Pointer.

use std::fmt;

/// A decoded JSON Pointer segment.
pub type PathStep = String;

/// A decoded JSON Pointer.
pub type Path = Vec<PathStep>;

/// How the last segment of a path addresses its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// The empty path: the document itself.
    Root,
    /// An object member (or a key on a scalar, which no operation can use).
    Member(String),
    /// An array element. May be out of range.
    Index(usize),
    /// The `-` segment on an array: one past the last element.
    Append,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Root => f.write_str(""),
            Key::Member(key) => f.write_str(key),
            Key::Index(index) => write!(f, "{index}"),
            Key::Append => f.write_str("-"),
        }
    }
}
