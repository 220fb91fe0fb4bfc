use thiserror::Error;

use crate::bind::Access;

/// Errors raised while parsing or applying a patch.
///
/// Each variant aborts the remaining operations of the patch it came from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("Couldn't find {access} property for pointer segment '{segment}' on {shape} in {path}")]
    UnresolvablePath {
        segment: String,
        path: String,
        shape: String,
        access: Access,
    },
    #[error(
        "Invalid collection index {index} for collection of size {size} at '{path}'. \
         Use '.../-' or the collection's actual size as index to append to it!"
    )]
    IndexOutOfBounds {
        path: String,
        index: usize,
        size: usize,
    },
    #[error("Path '{path}' is not nullable.")]
    NotNullable { path: String },
    #[error("Test against path '{path}' failed.")]
    TestFailed { path: String },
    #[error("Unrecognized operation type: {op}")]
    UnsupportedOperation { op: String },
    #[error("Could not read value for '{path}' as {shape}: {reason}")]
    EvaluationFailed {
        path: String,
        shape: String,
        reason: String,
    },
    #[error("No value present at '{path}'")]
    NoSuchValue { path: String },
    #[error("Invalid patch document: {0}")]
    InvalidDocument(String),
}

impl PatchError {
    /// The pointer the failure refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            PatchError::UnresolvablePath { path, .. }
            | PatchError::IndexOutOfBounds { path, .. }
            | PatchError::NotNullable { path }
            | PatchError::TestFailed { path }
            | PatchError::EvaluationFailed { path, .. }
            | PatchError::NoSuchValue { path } => Some(path),
            PatchError::UnsupportedOperation { .. } | PatchError::InvalidDocument(_) => None,
        }
    }
}
