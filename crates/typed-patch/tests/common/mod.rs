#![allow(dead_code)]

pub mod fixtures;

use serde_json::Value;
use typed_patch::{Binder, JsonPatchConverter, Patch, PatchConverter, PatchError, ShapeRef};

/// Parses a JSON Patch array, panicking on malformed input.
pub fn patch(document: Value) -> Patch {
    JsonPatchConverter
        .parse(&document)
        .unwrap_or_else(|e| panic!("bad patch {document}: {e}"))
}

pub fn apply(doc: &Value, shape: &ShapeRef, document: Value) -> Result<Value, PatchError> {
    patch(document).apply(doc, shape, &Binder::exact())
}
