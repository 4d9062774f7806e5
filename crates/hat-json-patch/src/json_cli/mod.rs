//! Text-in, text-out operations behind the `json-diff` and `json-patch`
//! binaries.

use serde_json::Value;
use thiserror::Error;

use crate::json_patch::{apply_patch, from_json_patch, inverse, to_json_patch, PatchError};
use crate::json_patch_diff::{diff_with_options, DiffOptions};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Patch(#[from] PatchError),
}

fn parse(text: &str) -> Result<Value, CliError> {
    Ok(serde_json::from_str(text)?)
}

/// Diffs two JSON documents and returns the patch as JSON text.
pub fn diff_json(a: &str, b: &str, invertible: bool) -> Result<String, CliError> {
    let options = DiffOptions { invertible, ..DiffOptions::default() };
    let patch = diff_with_options(&parse(a)?, &parse(b)?, &options);
    Ok(serde_json::to_string_pretty(&to_json_patch(&patch))?)
}

/// Applies a JSON Patch (given as JSON text) to a JSON document.
pub fn apply_json_patch(doc: &str, patch: &str) -> Result<String, CliError> {
    let patch = from_json_patch(&parse(patch)?)?;
    let out = apply_patch(&parse(doc)?, &patch)?;
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Inverts a JSON Patch given as JSON text.
pub fn invert_json_patch(patch: &str) -> Result<String, CliError> {
    let patch = from_json_patch(&parse(patch)?)?;
    Ok(serde_json::to_string_pretty(&to_json_patch(&inverse(&patch)?))?)
}
