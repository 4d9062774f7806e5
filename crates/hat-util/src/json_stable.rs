//! Deterministic JSON serialization with sorted object keys.
//!
//! Two values that are [`deep_equal`](crate::deep_equal) always stringify to
//! the same text, which makes the output usable as an element hash when
//! matching array items.

use serde_json::{Number, Value};

/// Serialize `val` to a deterministic JSON string.
///
/// Object keys are emitted in sorted order and integral floats are written
/// without a fractional part (`1.0` becomes `1`).
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use hat_util::stringify;
///
/// assert_eq!(stringify(&json!({"b": 1.0, "a": [true, null]})), r#"{"a":[true,null],"b":1}"#);
/// ```
pub fn stringify(val: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, val);
    out
}

fn write_value(out: &mut String, val: &Value) {
    match val {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, &obj[key.as_str()]);
            }
            out.push('}');
        }
    }
}

// 2^53: above this an f64 no longer represents every integer.
const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_992.0;

fn write_number(out: &mut String, n: &Number) {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < MAX_SAFE_FLOAT {
                out.push_str(&(f as i64).to_string());
                return;
            }
        }
    }
    out.push_str(&n.to_string());
}

fn write_string(out: &mut String, s: &str) {
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
    }
}
