//! Core types for the JSON Patch module.

use std::fmt;

use hat_json_pointer::{format_json_pointer, JsonPointerError};
use serde_json::Value;
use thiserror::Error;

pub use hat_json_pointer::Path;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// Malformed operation, or an operation whose target location is unusable.
    #[error("invalid patch operation: {0}")]
    InvalidPatchOperation(String),
    /// A `test` operation did not match.
    #[error("test failed: {0}")]
    TestFailed(String),
    /// The patch lacks the information needed to undo it.
    #[error("patch not invertible: {0}")]
    PatchNotInvertible(String),
    /// Two operations cannot be reordered.
    #[error("cannot commute: {0}")]
    CannotCommute(String),
}

impl From<JsonPointerError> for PatchError {
    fn from(err: JsonPointerError) -> Self {
        PatchError::InvalidPatchOperation(err.to_string())
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A JSON Patch operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Move { path: Path, from: Path },
    Copy { path: Path, from: Path },
    Test { path: Path, value: Value },
}

/// A sequence of operations applied left to right.
pub type Patch = Vec<Op>;

impl Op {
    /// Returns the operation name as used in the JSON representation.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Move { .. } => "move",
            Op::Copy { .. } => "copy",
            Op::Test { .. } => "test",
        }
    }

    /// Returns the path of the operation.
    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Move { path, .. }
            | Op::Copy { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    /// Returns the source path of `move` and `copy`.
    pub fn from(&self) -> Option<&Path> {
        match self {
            Op::Move { from, .. } | Op::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Returns the value carried by `add`, `replace` and `test`.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Op::Add { value, .. } | Op::Replace { value, .. } | Op::Test { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Op::Test { .. })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.op_name(), format_json_pointer(self.path()))?;
        if let Some(from) = self.from() {
            write!(f, " from {:?}", format_json_pointer(from))?;
        }
        Ok(())
    }
}
