//! hat-util - JSON value helpers shared by the hat crates.
//!
//! - [`json_equal`] structural equality with JSON number semantics
//! - [`json_stable`] deterministic stringification used as an element hash
//! - [`state_path`] typed paths into the renderer state

pub mod json_equal;
pub mod json_stable;
pub mod state_path;

pub use json_equal::{deep_equal, number_equal};
pub use json_stable::stringify;
pub use state_path::{Segment, StatePath, StatePathError};
