//! Conversion between patch representations and [`Patch`].

pub mod json;
pub mod merge;

use serde_json::Value;

use crate::error::PatchError;
use crate::patch::Patch;

pub use json::JsonPatchConverter;
pub use merge::MergePatchConverter;

/// Translates a representation into a [`Patch`] and back.
pub trait PatchConverter {
    fn parse(&self, document: &Value) -> Result<Patch, PatchError>;

    fn render(&self, patch: &Patch) -> Result<Value, PatchError>;
}
