//! Validation of JSON Pointer strings and decoded paths.

use crate::JsonPointerError;

/// Maximum allowed pointer string length.
const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum allowed path depth.
const MAX_PATH_LENGTH: usize = 256;

/// Validates a JSON Pointer string.
///
/// # Errors
///
/// When the pointer is non-empty but doesn't start with `/`, exceeds 1024
/// characters, or contains a `~` not followed by `0` or `1`.
///
/// ```
/// use hat_json_pointer::validate_json_pointer;
///
/// assert!(validate_json_pointer("").is_ok());
/// assert!(validate_json_pointer("/a~1b").is_ok());
/// assert!(validate_json_pointer("a").is_err());
/// assert!(validate_json_pointer("/a~2").is_err());
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), JsonPointerError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(JsonPointerError::Invalid(format!(
            "pointer {pointer:?} must start with \"/\""
        )));
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(JsonPointerError::Invalid("pointer too long".into()));
    }
    let mut chars = pointer.chars();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.next(), Some('0') | Some('1')) {
            return Err(JsonPointerError::Invalid(format!(
                "pointer {pointer:?} has an invalid escape"
            )));
        }
    }
    Ok(())
}

/// Validates a decoded path.
///
/// # Errors
///
/// When the path is deeper than 256 segments.
pub fn validate_path(path: &[String]) -> Result<(), JsonPointerError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(JsonPointerError::Invalid("path too long".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_pointer_is_rejected() {
        let pointer = "/a".repeat(600);
        assert!(validate_json_pointer(&pointer).is_err());
    }

    #[test]
    fn deep_path_is_rejected() {
        let path = vec!["x".to_string(); 257];
        assert!(validate_path(&path).is_err());
        assert!(validate_path(&path[..256]).is_ok());
    }

    #[test]
    fn trailing_tilde_is_rejected() {
        assert!(validate_json_pointer("/a~").is_err());
    }
}
