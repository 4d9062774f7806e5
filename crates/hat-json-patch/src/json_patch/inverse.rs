//! Inverting patches.
//!
//! A `replace` or `remove` can only be undone when the patch also carries the
//! value it overwrote, which the invertible form provides as a `test` of the
//! same path immediately before it.

use super::types::{Op, Patch, PatchError};

/// Returns the patch that undoes `patch`.
///
/// The input is walked right to left; `replace` and `remove` consume their
/// preceding `test` together with themselves.
///
/// # Errors
///
/// [`PatchError::PatchNotInvertible`] for `copy`, and for a `replace` or
/// `remove` not preceded by a `test` of the same path.
pub fn inverse(patch: &[Op]) -> Result<Patch, PatchError> {
    let mut out = Vec::with_capacity(patch.len());
    let mut i = patch.len();
    while i > 0 {
        let prev = if i > 1 { patch.get(i - 2) } else { None };
        i -= invert_op(&mut out, &patch[i - 1], prev)?;
    }
    Ok(out)
}

/// Pushes the inverse of `op` onto `out` and returns how many input operations
/// were consumed.
fn invert_op(out: &mut Patch, op: &Op, prev: Option<&Op>) -> Result<usize, PatchError> {
    match op {
        Op::Test { .. } => {
            out.push(op.clone());
            Ok(1)
        }
        Op::Add { path, value } => {
            out.push(Op::Test { path: path.clone(), value: value.clone() });
            out.push(Op::Remove { path: path.clone() });
            Ok(1)
        }
        Op::Replace { path, value } => {
            let old = preceding_test(op, prev)?;
            out.push(Op::Test { path: path.clone(), value: value.clone() });
            out.push(Op::Replace { path: path.clone(), value: old.clone() });
            Ok(2)
        }
        Op::Remove { path } => {
            let old = preceding_test(op, prev)?;
            out.push(Op::Add { path: path.clone(), value: old.clone() });
            Ok(2)
        }
        Op::Move { path, from } => {
            out.push(Op::Move { path: from.clone(), from: path.clone() });
            Ok(1)
        }
        Op::Copy { .. } => Err(PatchError::PatchNotInvertible(format!(
            "cannot invert {op}: the overwritten value is unknown"
        ))),
    }
}

fn preceding_test<'a>(op: &Op, prev: Option<&'a Op>) -> Result<&'a serde_json::Value, PatchError> {
    match prev {
        Some(Op::Test { path, value }) if path == op.path() => Ok(value),
        _ => Err(PatchError::PatchNotInvertible(format!(
            "cannot invert {op} without a preceding test of the same path"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::apply::apply_patch;
    use hat_json_pointer::parse_json_pointer;
    use serde_json::json;

    fn path(s: &str) -> Vec<String> {
        parse_json_pointer(s)
    }

    #[test]
    fn add_becomes_test_and_remove() {
        let inv = inverse(&[Op::Add { path: path("/a"), value: json!(1) }]).unwrap();
        assert_eq!(
            inv,
            vec![
                Op::Test { path: path("/a"), value: json!(1) },
                Op::Remove { path: path("/a") },
            ]
        );
    }

    #[test]
    fn replace_consumes_its_test() {
        let patch = vec![
            Op::Test { path: path("/a"), value: json!(1) },
            Op::Replace { path: path("/a"), value: json!(2) },
        ];
        let inv = inverse(&patch).unwrap();
        assert_eq!(
            inv,
            vec![
                Op::Test { path: path("/a"), value: json!(2) },
                Op::Replace { path: path("/a"), value: json!(1) },
            ]
        );
    }

    #[test]
    fn remove_consumes_its_test() {
        let patch = vec![
            Op::Test { path: path("/a/0"), value: json!("x") },
            Op::Remove { path: path("/a/0") },
        ];
        assert_eq!(inverse(&patch).unwrap(), vec![Op::Add { path: path("/a/0"), value: json!("x") }]);
    }

    #[test]
    fn replace_without_test_is_not_invertible() {
        let r = inverse(&[Op::Replace { path: path("/a"), value: json!(2) }]);
        assert!(matches!(r, Err(PatchError::PatchNotInvertible(_))));
        let patch = vec![
            Op::Test { path: path("/b"), value: json!(1) },
            Op::Remove { path: path("/a") },
        ];
        assert!(matches!(inverse(&patch), Err(PatchError::PatchNotInvertible(_))));
    }

    #[test]
    fn copy_is_not_invertible() {
        let r = inverse(&[Op::Copy { path: path("/b"), from: path("/a") }]);
        assert!(matches!(r, Err(PatchError::PatchNotInvertible(_))));
    }

    #[test]
    fn move_swaps_paths() {
        let inv = inverse(&[Op::Move { path: path("/b"), from: path("/a") }]).unwrap();
        assert_eq!(inv, vec![Op::Move { path: path("/a"), from: path("/b") }]);
    }

    #[test]
    fn inverse_restores_document() {
        let a = json!({"list": [1, 2, 3], "name": "x"});
        let patch = vec![
            Op::Test { path: path("/list/0"), value: json!(1) },
            Op::Remove { path: path("/list/0") },
            Op::Add { path: path("/list/-"), value: json!(4) },
            Op::Test { path: path("/name"), value: json!("x") },
            Op::Replace { path: path("/name"), value: json!("y") },
            Op::Move { path: path("/moved"), from: path("/name") },
        ];
        let b = apply_patch(&a, &patch).unwrap();
        assert_eq!(b, json!({"list": [2, 3, 4], "moved": "y"}));
        let inv = inverse(&[
            Op::Test { path: path("/list/0"), value: json!(1) },
            Op::Remove { path: path("/list/0") },
            Op::Add { path: path("/list/2"), value: json!(4) },
            Op::Test { path: path("/name"), value: json!("x") },
            Op::Replace { path: path("/name"), value: json!("y") },
            Op::Move { path: path("/moved"), from: path("/name") },
        ])
        .unwrap();
        assert_eq!(apply_patch(&b, &inv).unwrap(), a);
    }
}
