//! Structural diff producing JSON Patch operations.
//!
//! Objects are compared key by key, arrays through the [`lcs`](crate::lcs)
//! differ over hashed elements, everything else by value. When
//! [`DiffOptions::invertible`] is set every `remove` and `replace` is preceded
//! by a `test` of the value it overwrites, so the patch can be passed to
//! [`inverse`](crate::inverse).

use hat_util::{deep_equal, stringify};
use serde_json::{Map, Value};

use crate::json_patch::{Op, Patch, Path};
use crate::lcs::{self, Edit};

/// Diff configuration.
#[derive(Debug, Clone, Copy)]
pub struct DiffOptions {
    /// Emit a `test` of the old value before each `remove` and `replace`.
    pub invertible: bool,
    /// Array element identity used by the LCS pass.
    pub hash: fn(&Value) -> String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self { invertible: true, hash: stringify }
    }
}

/// Computes an invertible patch turning `a` into `b`.
///
/// ```
/// use hat_json_patch::{apply_patch, diff};
/// use serde_json::json;
///
/// let a = json!({"a": 1, "b": [1, 2]});
/// let b = json!({"a": 1, "b": [2], "c": true});
/// assert_eq!(apply_patch(&a, &diff(&a, &b)).unwrap(), b);
/// ```
pub fn diff(a: &Value, b: &Value) -> Patch {
    diff_with_options(a, b, &DiffOptions::default())
}

/// Computes a patch turning `a` into `b` under `options`.
pub fn diff_with_options(a: &Value, b: &Value, options: &DiffOptions) -> Patch {
    let mut differ = Differ { options, patch: Vec::new() };
    let mut path = Vec::new();
    differ.value(&mut path, a, b);
    log::trace!("diff produced {} operations", differ.patch.len());
    differ.patch
}

struct Differ<'o> {
    options: &'o DiffOptions,
    patch: Patch,
}

impl Differ<'_> {
    fn value(&mut self, path: &mut Path, a: &Value, b: &Value) {
        match (a, b) {
            (Value::Object(a), Value::Object(b)) => self.object(path, a, b),
            (Value::Array(a), Value::Array(b)) => self.array(path, a, b),
            _ if deep_equal(a, b) => {}
            _ => {
                self.test(path, a);
                self.patch.push(Op::Replace { path: path.clone(), value: b.clone() });
            }
        }
    }

    fn test(&mut self, path: &Path, old: &Value) {
        if self.options.invertible {
            self.patch.push(Op::Test { path: path.clone(), value: old.clone() });
        }
    }

    fn remove(&mut self, path: Path, old: &Value) {
        self.test(&path, old);
        self.patch.push(Op::Remove { path });
    }

    fn object(&mut self, path: &mut Path, a: &Map<String, Value>, b: &Map<String, Value>) {
        for (key, new) in b {
            path.push(key.clone());
            match a.get(key) {
                Some(old) => self.value(path, old, new),
                None => self.patch.push(Op::Add { path: path.clone(), value: new.clone() }),
            }
            path.pop();
        }
        for (key, old) in a {
            if !b.contains_key(key) {
                let mut at = path.clone();
                at.push(key.clone());
                self.remove(at, old);
            }
        }
    }

    fn array(&mut self, path: &mut Path, a: &[Value], b: &[Value]) {
        let hash = self.options.hash;
        let a_hashes: Vec<String> = a.iter().map(hash).collect();
        let b_hashes: Vec<String> = b.iter().map(hash).collect();
        let lcs = lcs::compare(&a_hashes, &b_hashes);

        // The working array is always b[..i] followed by a[j..], so index `i`
        // addresses the element every edit touches.
        lcs::reduce(&lcs, (), |(), edit, i, j| {
            path.push(i.to_string());
            match edit {
                Edit::Skip => self.value(path, &a[j], &b[i]),
                Edit::Remove => self.remove(path.clone(), &a[j]),
                Edit::Add => self.add_or_replace(path.clone(), &b[i]),
            }
            path.pop();
        });
    }

    /// An `add` right after a `remove` of the same slot becomes a `replace`.
    fn add_or_replace(&mut self, path: Path, value: &Value) {
        if let Some(last) = self.patch.last_mut() {
            if matches!(last, Op::Remove { path: removed } if *removed == path) {
                *last = Op::Replace { path, value: value.clone() };
                return;
            }
        }
        self.patch.push(Op::Add { path, value: value.clone() });
    }
}
