mod common;

use std::sync::Arc;
use std::thread;

use common::fixtures::{hobbit_shape, todos_shape};
use typed_patch::{bind, Access, Binder, MappedBindContext, Path, Shape};

#[test]
fn repeated_binds_share_one_instance() {
    let path = Path::of("/tags/-");
    let a = bind(&path, &hobbit_shape(), Access::Write, &Binder::exact()).unwrap();
    let b = bind(&Path::of("/tags/-"), &hobbit_shape(), Access::Write, &Binder::exact()).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn key_covers_access_binder_and_shape() {
    let path = Path::of("/name");
    let exact = Binder::exact();
    let read = bind(&path, &hobbit_shape(), Access::Read, &exact).unwrap();
    let write = bind(&path, &hobbit_shape(), Access::Write, &exact).unwrap();
    assert!(!Arc::ptr_eq(&read, &write));

    let other = Binder::new(MappedBindContext::new());
    let mapped = bind(&path, &hobbit_shape(), Access::Read, &other).unwrap();
    assert!(!Arc::ptr_eq(&read, &mapped));
    assert_eq!(mapped.context(), other.id());

    let lookalike = Shape::record("Hobbit").field("name", Shape::string()).build();
    let fresh = bind(&path, &lookalike, Access::Read, &exact).unwrap();
    assert!(!Arc::ptr_eq(&read, &fresh));
}

#[test]
fn failed_binds_report_every_time() {
    let path = Path::of("/0/nope");
    for _ in 0..2 {
        assert!(bind(&path, &todos_shape(), Access::Read, &Binder::exact()).is_err());
    }
}

#[test]
fn concurrent_binds_agree() {
    let pointers: Vec<String> = (0..64).map(|i| format!("/{i}/items/-")).collect();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pointers = pointers.clone();
            thread::spawn(move || {
                pointers
                    .iter()
                    .map(|p| {
                        let typed =
                            bind(&Path::of(p), &todos_shape(), Access::Write, &Binder::exact())
                                .unwrap();
                        (typed.path().as_str().to_string(), typed.leaf().id(), typed.steps().len())
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
    assert!(results[0].iter().all(|(_, _, len)| *len == 3));
}
