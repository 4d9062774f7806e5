//! Deep equality for JSON values.
//!
//! `serde_json` keeps integers and floats apart (`1 != 1.0`). JSON itself has a
//! single number type, so equality here compares numbers by value.

use serde_json::{Number, Value};

/// Performs a deep equality check between two JSON values.
///
/// Arrays are compared element by element, objects key by key regardless of
/// insertion order, numbers by numeric value.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use hat_util::deep_equal;
///
/// assert!(deep_equal(&json!({"a": [1, 2], "b": 1}), &json!({"b": 1.0, "a": [1, 2]})));
/// assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            if a.len() != b.len() {
                return false;
            }
            a.iter().all(|(key, x)| match b.get(key) {
                Some(y) => deep_equal(x, y),
                None => false,
            })
        }
        _ => false,
    }
}

/// Compares two JSON numbers by value.
///
/// Integers of the same representation are compared exactly; anything else
/// falls back to `f64`.
pub fn number_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
