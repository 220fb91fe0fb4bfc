//! typed-patch - JSON Patch and Merge Patch applied through declared shapes.
//!
//! Documents are plain [`serde_json::Value`]s paired with a [`Shape`] that
//! describes them. Pointer paths are bound against the shape once, checked
//! for reachability under a [`Binder`], cached, and then replayed against any
//! number of documents. Operation values are conformed to the shape of the
//! destination before they are written.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use typed_patch::{Binder, JsonPatchConverter, PatchConverter, Shape};
//!
//! let shape = Shape::record("Hobbit")
//!     .field("name", Shape::string())
//!     .field("age", Shape::optional(Shape::integer()))
//!     .build();
//! let patch = JsonPatchConverter
//!     .parse(&json!([{"op": "replace", "path": "/age", "value": 50.0}]))
//!     .unwrap();
//! let out = patch
//!     .apply(&json!({"name": "Bilbo", "age": null}), &shape, &Binder::exact())
//!     .unwrap();
//! assert_eq!(out, json!({"name": "Bilbo", "age": 50}));
//! ```

pub mod bind;
pub mod cli;
pub mod codec;
pub mod error;
pub mod ops;
pub mod patch;
pub mod shape;
pub mod typed_path;
pub mod value;

pub use bind::{Access, BindContext, Binder, ContextId, ExactBindContext, FnBindContext, MappedBindContext};
pub use codec::{JsonPatchConverter, MergePatchConverter, PatchConverter};
pub use error::PatchError;
pub use ops::Operation;
pub use patch::Patch;
pub use shape::{
    CollectionKind, Patchable, RecordBuilder, ScalarKind, Shape, ShapeDescriptor, ShapeId,
    ShapeKind, ShapeRef,
};
pub use typed_path::{
    bind, binding_cache_capacity, binding_cache_len, clear_binding_cache,
    set_binding_cache_capacity, Step, TypedPath,
};
pub use value::{conform, JsonLateValue, LateValue, OpValue};

pub use typed_patch_pointer::{Path, Segment, SegmentKind};
