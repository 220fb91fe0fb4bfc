//! JSON equality utilities.
//!
//! Provides deep equality comparison with normalized numbers.

mod deep_equal;

pub use deep_equal::{deep_equal, numbers_equal};
