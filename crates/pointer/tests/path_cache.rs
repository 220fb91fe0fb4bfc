//! Kept in its own test binary: it resizes and clears the process-wide cache.

use std::sync::Arc;

use typed_patch_pointer::{clear_path_cache, path_cache_len, set_path_cache_capacity, Path};

#[test]
fn cache_shares_instances_and_clears_at_capacity() {
    let first = Path::of("/shared/a");
    let again = Path::of("/shared/a");
    assert!(Arc::ptr_eq(&first, &again));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            std::thread::spawn(move || {
                for i in 0..50 {
                    let pointer = format!("/thread/{t}/{i}");
                    assert_eq!(Path::of(&pointer).as_str(), pointer);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    set_path_cache_capacity(16);
    for i in 0..100 {
        Path::of(&format!("/bounded/{i}"));
    }
    assert!(path_cache_len() <= 16);

    clear_path_cache();
    assert_eq!(path_cache_len(), 0);
    set_path_cache_capacity(4096);
}
