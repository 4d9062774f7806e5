//! JSON Patch apply logic.

use hat_json_pointer::{find, find_mut, format_json_pointer, is_child, Key};
use hat_util::deep_equal;
use serde_json::Value;

use super::types::{Op, PatchError};

fn invalid(message: impl Into<String>) -> PatchError {
    PatchError::InvalidPatchOperation(message.into())
}

fn missing(path: &[String]) -> PatchError {
    invalid(format!("path {:?} does not exist", format_json_pointer(path)))
}

// ── Individual operation applicators ─────────────────────────────────────

fn add(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    let found = find_mut(doc, path)?.ok_or_else(|| missing(path))?;
    match (found.key, found.container) {
        (Key::Root, doc) => *doc = value,
        (Key::Append, Value::Array(arr)) => arr.push(value),
        (Key::Index(index), Value::Array(arr)) => {
            if index > arr.len() {
                return Err(invalid(format!(
                    "target of add outside of array bounds: {:?}",
                    format_json_pointer(path)
                )));
            }
            arr.insert(index, value);
        }
        (Key::Member(key), Value::Object(map)) => {
            map.insert(key, value);
        }
        _ => {
            return Err(invalid(format!(
                "target of add must be an object or array: {:?}",
                format_json_pointer(path)
            )))
        }
    }
    Ok(())
}

fn remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    let found = find_mut(doc, path)?.ok_or_else(|| missing(path))?;
    match (found.key, found.container) {
        (Key::Index(index), Value::Array(arr)) if index < arr.len() => Ok(arr.remove(index)),
        (Key::Member(key), Value::Object(map)) => map.shift_remove(&key).ok_or_else(|| missing(path)),
        _ => Err(missing(path)),
    }
}

fn replace(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    let mut found = find_mut(doc, path)?.ok_or_else(|| missing(path))?;
    let slot = found.value_mut().ok_or_else(|| missing(path))?;
    *slot = value;
    Ok(())
}

fn copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    let value = find(doc, from)?
        .and_then(|found| found.value())
        .cloned()
        .ok_or_else(|| invalid(format!("copy.from {:?} must exist", format_json_pointer(from))))?;
    add(doc, path, value)
}

fn move_value(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    if is_child(from, path) {
        return Err(invalid(format!(
            "move.from {:?} cannot be an ancestor of move.path {:?}",
            format_json_pointer(from),
            format_json_pointer(path)
        )));
    }
    let value = remove(doc, from)?;
    add(doc, path, value)
}

fn check(doc: &Value, path: &[String], expected: &Value) -> Result<(), PatchError> {
    let actual = find(doc, path)?.and_then(|found| found.value());
    match actual {
        Some(actual) if deep_equal(actual, expected) => Ok(()),
        Some(actual) => Err(PatchError::TestFailed(format!(
            "{:?}: expected {expected}, found {actual}",
            format_json_pointer(path)
        ))),
        None => Err(PatchError::TestFailed(format!(
            "{:?}: expected {expected}, found nothing",
            format_json_pointer(path)
        ))),
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Apply a single operation to `doc` in place.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<(), PatchError> {
    match op {
        Op::Add { path, value } => add(doc, path, value.clone()),
        Op::Remove { path } => remove(doc, path).map(drop),
        Op::Replace { path, value } => replace(doc, path, value.clone()),
        Op::Move { path, from } => move_value(doc, path, from),
        Op::Copy { path, from } => copy(doc, path, from),
        Op::Test { path, value } => check(doc, path, value),
    }
}

/// Apply `patch` to a clone of `doc` and return the result.
///
/// The caller's document is never touched: on the first failing operation
/// the working copy is dropped and the error returned.
pub fn apply_patch(doc: &Value, patch: &[Op]) -> Result<Value, PatchError> {
    let mut working = doc.clone();
    apply_patch_in_place(&mut working, patch)?;
    Ok(working)
}

/// Apply `patch` directly to `doc`.
///
/// Operations before a failing one stay applied, so on error `doc` may be
/// partially patched.
pub fn apply_patch_in_place(doc: &mut Value, patch: &[Op]) -> Result<(), PatchError> {
    for op in patch {
        apply_op(doc, op)?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────
