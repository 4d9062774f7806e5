//! hat-json-patch - structural diff and patch for JSON values.
//!
//! - [`json_patch`] RFC 6902 operations: apply, inverse, commute, JSON codec
//! - [`lcs`] longest-common-subsequence edit scripts used for arrays
//! - [`json_patch_diff`] computes a patch turning one value into another
//! - [`json_cli`] logic behind the `json-diff` and `json-patch` binaries
//!
//! ```
//! use hat_json_patch::{apply_patch, diff, inverse};
//! use serde_json::json;
//!
//! let a = json!({"items": ["x", "y", "z"]});
//! let b = json!({"items": ["x", "z", "w"]});
//! let patch = diff(&a, &b);
//! assert_eq!(apply_patch(&a, &patch).unwrap(), b);
//! assert_eq!(apply_patch(&b, &inverse(&patch).unwrap()).unwrap(), a);
//! ```

pub mod json_cli;
pub mod json_patch;
pub mod json_patch_diff;
pub mod lcs;

pub use json_patch::{
    apply_op, apply_patch, apply_patch_in_place, commute, from_json, from_json_patch, inverse,
    to_json, to_json_patch, Op, Patch, PatchError,
};
pub use json_patch_diff::{diff, diff_with_options, DiffOptions};
