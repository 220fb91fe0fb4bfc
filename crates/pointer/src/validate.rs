//! Validation functions for JSON Pointer.

use thiserror::Error;

use crate::util::split_pointer;

/// Maximum allowed pointer string length.
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum allowed path depth.
pub const MAX_PATH_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("pointer '{0}' must start with '/'")]
    PointerInvalid(String),
    #[error("pointer is {0} bytes long, the limit is {MAX_POINTER_LENGTH}")]
    PointerTooLong(usize),
    #[error("pointer has {0} segments, the limit is {MAX_PATH_DEPTH}")]
    PathTooDeep(usize),
}

/// Validate a JSON Pointer string.
///
/// # Example
///
/// ```
/// use typed_patch_pointer::validate_pointer;
///
/// validate_pointer("").unwrap();
/// validate_pointer("/foo/bar").unwrap();
/// validate_pointer("foo").unwrap_err();
/// ```
pub fn validate_pointer(pointer: &str) -> Result<(), ValidationError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(ValidationError::PointerInvalid(pointer.to_string()));
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(ValidationError::PointerTooLong(pointer.len()));
    }
    let depth = split_pointer(pointer).len();
    if depth > MAX_PATH_DEPTH {
        return Err(ValidationError::PathTooDeep(depth));
    }
    Ok(())
}
