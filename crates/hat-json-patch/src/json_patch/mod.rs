//! JSON Patch (RFC 6902).
//!
//! All six RFC operations are supported: `add`, `remove`, `replace`, `move`,
//! `copy`, `test`. Besides applying a patch, a patch produced in invertible
//! form (every `replace` and `remove` preceded by a `test` of the old value)
//! can be inverted, and two adjacent operations can be commuted.

pub mod apply;
pub mod codec;
pub mod commute;
pub mod inverse;
pub mod types;

pub use apply::{apply_op, apply_patch, apply_patch_in_place};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
pub use commute::commute;
pub use inverse::inverse;
pub use types::{Op, Patch, PatchError, Path};
