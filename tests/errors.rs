//! Failure surfaces: wrong-typed segments, unreachable store, bad parameters.

use redbloom::{ErrorKind, FilterSpec, MemoryStore, RedBloomError, RemoteBloomFilter};

fn open(store: &MemoryStore) -> RemoteBloomFilter<MemoryStore> {
    RemoteBloomFilter::with_store(FilterSpec::new("typed", 1000, 0.01), store.clone()).unwrap()
}

fn poisoned() -> (MemoryStore, RemoteBloomFilter<MemoryStore>) {
    let store = MemoryStore::new();
    let filter = open(&store);
    store.insert_foreign("typed.0", "hash");
    (store, filter)
}

#[test]
fn test_wrong_type_on_add() {
    let (_, filter) = poisoned();
    let err = filter.add("x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(err.to_string().contains("typed.0"));
}

#[test]
fn test_wrong_type_on_update() {
    let (_, filter) = poisoned();
    let err = filter.update(&["a", "b"]).unwrap_err();
    assert!(matches!(err, RedBloomError::TypeMismatch { .. }));
}

#[test]
fn test_wrong_type_on_contains() {
    let (_, filter) = poisoned();
    assert!(matches!(
        filter.contains("x").unwrap_err(),
        RedBloomError::TypeMismatch { .. }
    ));
}

#[test]
fn test_wrong_type_on_intersection() {
    let (_, filter) = poisoned();
    assert!(matches!(
        filter.intersection(&["x", "y"]).unwrap_err(),
        RedBloomError::TypeMismatch { .. }
    ));
}

#[test]
fn test_wrong_type_on_count() {
    let (_, filter) = poisoned();
    assert_eq!(filter.count_set_bits().unwrap_err().kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_wrong_type_segment_does_not_block_other_segments() {
    let store = MemoryStore::new().with_max_string_bytes(8);
    let filter = RemoteBloomFilter::with_store(FilterSpec::new("multi", 100, 0.01), store.clone()).unwrap();
    assert!(filter.segment_count() > 2);
    store.insert_foreign("multi.0", "list");

    let items: Vec<String> = (0..50).map(|i| format!("m{i}")).collect();
    assert_eq!(filter.update(&items).unwrap_err().kind(), ErrorKind::TypeMismatch);

    let last = filter.keys().last().unwrap().clone();
    assert!(store.string_len(&last).is_some(), "segments after the bad one were written");
}

#[test]
fn test_delete_removes_foreign_value() {
    let (store, filter) = poisoned();
    filter.delete().unwrap();
    assert!(!store.contains_key(b"typed.0"));
    assert!(filter.add("x").unwrap());
}

#[test]
fn test_empty_batch_skips_poisoned_store() {
    let (_, filter) = poisoned();
    let none: [&str; 0] = [];
    assert_eq!(filter.update(&none).unwrap(), 0);
    assert!(filter.intersection(&none).unwrap().is_empty());
}

#[test]
fn test_unavailable_store_fails_every_operation() {
    let store = MemoryStore::new();
    let filter = open(&store);
    filter.add("before").unwrap();

    store.set_unavailable(true);
    let failures = [
        filter.add("x").unwrap_err(),
        filter.update(&["x"]).unwrap_err(),
        filter.contains("before").unwrap_err(),
        filter.intersection(&["before"]).unwrap_err(),
        filter.delete().unwrap_err(),
        filter.count_set_bits().unwrap_err(),
    ];
    for err in &failures {
        assert_eq!(err.kind(), ErrorKind::Connection, "{err}");
        assert!(err.is_retryable_for_writes());
    }

    // No local fallback: once the store is back, nothing was written meanwhile.
    store.set_unavailable(false);
    assert!(filter.contains("before").unwrap());
    assert!(!filter.contains("x").unwrap());
}

#[test]
fn test_unreachable_store_at_construction() {
    let store = MemoryStore::new();
    store.set_unavailable(true);
    let err = RemoteBloomFilter::with_store(FilterSpec::new("k", 10, 0.1), store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[test]
fn test_invalid_parameters() {
    let cases = [
        (FilterSpec::new("k", 0, 0.1), ErrorKind::Validation),
        (FilterSpec::new("k", 10, 0.0), ErrorKind::Validation),
        (FilterSpec::new("k", 10, 1.0), ErrorKind::Validation),
        (FilterSpec::new("k", 10, -0.5), ErrorKind::Validation),
        (FilterSpec::new("k", 10, f64::NAN), ErrorKind::Validation),
        (FilterSpec::new("", 10, 0.1), ErrorKind::Validation),
        (FilterSpec::new("k", 10, 0.1).with_db(-1), ErrorKind::Validation),
    ];
    for (spec, kind) in cases {
        let err = RemoteBloomFilter::with_store(spec.clone(), MemoryStore::new()).unwrap_err();
        assert_eq!(err.kind(), kind, "{spec:?}");
    }

    assert!(matches!(
        RemoteBloomFilter::with_store(FilterSpec::new("k", 0, 0.1), MemoryStore::new()).unwrap_err(),
        RedBloomError::InvalidCapacity { capacity: 0 }
    ));
    assert!(matches!(
        RemoteBloomFilter::with_store(FilterSpec::new("k", 10, 1.0), MemoryStore::new()).unwrap_err(),
        RedBloomError::ErrorRateOutOfBounds { .. }
    ));
    assert!(matches!(
        RemoteBloomFilter::with_store(FilterSpec::new("k", 10, 0.1).with_db(-2), MemoryStore::new()).unwrap_err(),
        RedBloomError::InvalidDatabase { db: -2 }
    ));
}

#[test]
fn test_database_out_of_store_range() {
    let err = RemoteBloomFilter::with_store(FilterSpec::new("k", 10, 0.1).with_db(99), MemoryStore::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_error_kind_codes() {
    assert_eq!(ErrorKind::Connection.code(), "CONNECTION");
    assert_eq!(ErrorKind::TypeMismatch.code(), "TYPE_MISMATCH");
    assert_eq!(ErrorKind::Protocol.code(), "PROTOCOL");
    assert_eq!(ErrorKind::Validation.code(), "VALIDATION");
}
