//! typed-patch-util - value helpers shared by the patch engine.

pub mod json_equal;
pub mod numeric;

pub use json_equal::deep_equal;
pub use numeric::{NormalizedNumber, MAX_EXPONENT};
