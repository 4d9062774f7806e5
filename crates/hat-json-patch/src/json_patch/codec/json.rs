//! JSON codec for JSON Patch operations.
//!
//! Converts operations to/from `serde_json::Value` in RFC 6902 format:
//! `{"op": "add", "path": "/a/b", "value": 1}`.

use hat_json_pointer::{format_json_pointer, parse_json_pointer, validate_json_pointer};
use serde_json::{json, Map, Value};

use crate::json_patch::types::{Op, Patch, PatchError, Path};

fn invalid(message: impl Into<String>) -> PatchError {
    PatchError::InvalidPatchOperation(message.into())
}

// ── Path helpers ──────────────────────────────────────────────────────────

fn encode_path(path: &[String]) -> Value {
    Value::String(format_json_pointer(path))
}

fn decode_path(op: &Map<String, Value>, field: &str) -> Result<Path, PatchError> {
    let pointer = op
        .get(field)
        .ok_or_else(|| invalid(format!("missing {field}")))?
        .as_str()
        .ok_or_else(|| invalid(format!("{field} must be a string")))?;
    validate_json_pointer(pointer)?;
    Ok(parse_json_pointer(pointer))
}

fn decode_value(op: &Map<String, Value>) -> Result<Value, PatchError> {
    op.get("value").cloned().ok_or_else(|| invalid("missing value"))
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` to its JSON Patch representation.
pub fn to_json(op: &Op) -> Value {
    match op {
        Op::Add { path, value } | Op::Replace { path, value } | Op::Test { path, value } => json!({
            "op": op.op_name(),
            "path": encode_path(path),
            "value": value,
        }),
        Op::Remove { path } => json!({
            "op": "remove",
            "path": encode_path(path),
        }),
        Op::Move { path, from } | Op::Copy { path, from } => json!({
            "op": op.op_name(),
            "path": encode_path(path),
            "from": encode_path(from),
        }),
    }
}

/// Serialize a patch to a JSON array.
pub fn to_json_patch(patch: &[Op]) -> Value {
    Value::Array(patch.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize one operation.
///
/// # Errors
///
/// [`PatchError::InvalidPatchOperation`] when the value is not an object, the
/// op name is unknown, or a field the op requires is missing or malformed.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let op = v.as_object().ok_or_else(|| invalid("operation must be an object"))?;
    let name = op
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing op"))?;
    let path = decode_path(op, "path")?;
    match name {
        "add" => Ok(Op::Add { path, value: decode_value(op)? }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace { path, value: decode_value(op)? }),
        "move" => Ok(Op::Move { path, from: decode_path(op, "from")? }),
        "copy" => Ok(Op::Copy { path, from: decode_path(op, "from")? }),
        "test" => Ok(Op::Test { path, value: decode_value(op)? }),
        other => Err(invalid(format!("unknown op {other:?}"))),
    }
}

/// Deserialize a patch from a JSON array.
pub fn from_json_patch(v: &Value) -> Result<Patch, PatchError> {
    v.as_array()
        .ok_or_else(|| invalid("patch must be an array"))?
        .iter()
        .map(from_json)
        .collect()
}
