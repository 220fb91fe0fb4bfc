//! Process-wide cache of parsed paths.
//!
//! The cache is bounded: once it holds [`path_cache_capacity`] entries it is
//! cleared and repopulated on demand. Dropping entries only costs re-parsing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::types::Path;

const DEFAULT_CAPACITY: usize = 4096;

static PATHS: LazyLock<DashMap<String, Arc<Path>>> = LazyLock::new(DashMap::new);
static CAPACITY: AtomicUsize = AtomicUsize::new(DEFAULT_CAPACITY);

pub(crate) fn lookup(pointer: &str) -> Arc<Path> {
    if let Some(path) = PATHS.get(pointer) {
        return Arc::clone(path.value());
    }

    let path = Arc::new(Path::parse(pointer));
    if PATHS.len() >= CAPACITY.load(Ordering::Relaxed) {
        PATHS.clear();
    }
    // Racing parsers produce equal paths; last writer wins.
    PATHS.insert(pointer.to_string(), Arc::clone(&path));
    path
}

/// Drops every cached path.
pub fn clear_path_cache() {
    PATHS.clear();
}

/// Number of cached paths.
pub fn path_cache_len() -> usize {
    PATHS.len()
}

pub fn path_cache_capacity() -> usize {
    CAPACITY.load(Ordering::Relaxed)
}

/// Sets the number of entries at which the cache is cleared. Minimum 1.
pub fn set_path_cache_capacity(capacity: usize) {
    CAPACITY.store(capacity.max(1), Ordering::Relaxed);
}
