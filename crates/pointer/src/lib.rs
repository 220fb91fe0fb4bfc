//! Pointer paths for typed patching.
//!
//! Parses `/`-separated pointer strings (RFC 6901 escaping) into segment
//! sequences without consulting any type information. A segment is only
//! classified lexically here: as a name, a numeric literal or an append
//! marker. Whether it addresses a property, a list position or a map key is
//! decided later, when the path is bound against a shape.
//!
//! # Example
//!
//! ```
//! use typed_patch_pointer::{format_pointer, get, Path};
//! use serde_json::json;
//!
//! let path = Path::of("/foo/bar~1baz");
//! assert_eq!(path.segments()[1].raw(), "bar/baz");
//! assert_eq!(format_pointer(&["foo", "bar/baz"]), path.as_str());
//!
//! let doc = json!({"foo": {"bar/baz": 42}});
//! assert_eq!(get(&doc, path.segments()), Some(&json!(42)));
//! ```

mod cache;
mod get;
pub mod types;
pub mod util;
pub mod validate;

pub use cache::{clear_path_cache, path_cache_capacity, path_cache_len, set_path_cache_capacity};
pub use get::{get, get_mut, step, step_mut};
pub use types::{Path, Segment, SegmentKind, APPEND_MARKERS};
pub use util::{escape_component, format_pointer, is_integer, split_pointer, unescape_component};
pub use validate::{validate_pointer, ValidationError, MAX_PATH_DEPTH, MAX_POINTER_LENGTH};
