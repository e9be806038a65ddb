//! Behaviour of the filter façade against an in-process store.

use proptest::prelude::*;
use redbloom::core::layout::REDIS_MAX_STRING_BYTES;
use redbloom::{FilterSpec, MemoryStore, RemoteBloomFilter};

fn open(store: &MemoryStore, key: &str, capacity: u64, error_rate: f64, db: i64) -> RemoteBloomFilter<MemoryStore> {
    RemoteBloomFilter::with_store(FilterSpec::new(key, capacity, error_rate).with_db(db), store.clone()).unwrap()
}

fn words(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}-{i}")).collect()
}

#[test]
fn test_add_then_contains() {
    let store = MemoryStore::new();
    let filter = open(&store, "f", 1000, 0.01, 0);

    assert!(filter.add("hello").unwrap());
    assert!(filter.contains("hello").unwrap());
    assert!(!filter.contains("goodbye").unwrap());
}

#[test]
fn test_update_counts_new_items() {
    let store = MemoryStore::new();
    let filter = open(&store, "f", 10_000, 0.001, 0);
    let items = words("u", 200);

    assert_eq!(filter.update(&items).unwrap(), 200);
    assert_eq!(filter.update(&items).unwrap(), 0);

    let mut mixed = words("u", 50);
    mixed.extend(words("v", 30));
    assert_eq!(filter.update(&mixed).unwrap(), 30);
}

#[test]
fn test_duplicates_within_one_update_count_once() {
    let filter = open(&MemoryStore::new(), "f", 1000, 0.01, 0);
    assert_eq!(filter.update(&["a", "b", "a", "a", "c"]).unwrap(), 3);
    assert_eq!(
        filter.add_batch(&["a", "d", "d"]).unwrap(),
        vec![false, true, false]
    );
}

#[test]
fn test_intersection_keeps_order() {
    let filter = open(&MemoryStore::new(), "f", 1000, 0.001, 0);
    filter.update(&["b", "d", "a"]).unwrap();

    let found = filter.intersection(&["a", "x", "b", "y", "d", "a"]).unwrap();
    assert_eq!(found, vec!["a", "b", "d", "a"]);

    let empty: Vec<String> = Vec::new();
    assert!(filter.intersection(&empty).unwrap().is_empty());
}

#[test]
fn test_two_instances_share_state() {
    let store = MemoryStore::new();
    let writer = open(&store, "shared", 5000, 0.01, 0);
    let reader = open(&store, "shared", 5000, 0.01, 0);

    writer.update(&words("w", 100)).unwrap();
    for item in words("w", 100) {
        assert!(reader.contains(&item).unwrap(), "reader missed {item}");
    }
    assert!(!reader.add("w-7").unwrap());
}

#[test]
fn test_delete_clears_filter_but_not_keys() {
    let store = MemoryStore::new();
    let filter = open(&store, "del", 1000, 0.01, 0);
    let keys_before = filter.keys().to_vec();
    let items = words("d", 50);

    filter.update(&items).unwrap();
    assert!(store.contains_key(b"del.0"));

    filter.delete().unwrap();
    assert!(filter.intersection(&items).unwrap().is_empty());
    assert_eq!(filter.keys(), keys_before.as_slice());
    assert_eq!(filter.keys(), open(&store, "del", 1000, 0.01, 0).keys());
    assert!(store.keys().is_empty());

    // Deleting an absent filter is not an error.
    filter.delete().unwrap();
}

#[test]
fn test_keys_depend_only_on_parameters() {
    let store = MemoryStore::new();
    let filter = open(&store, "k", 10_000, 0.1, 0);
    assert_eq!(filter.keys(), &[b"k.0".to_vec()]);

    filter.update(&words("k", 1000)).unwrap();
    assert_eq!(filter.keys().len(), 1);

    // 4.79e9 bits over 2^32-bit segments
    let big = open(&store, "big", 200_000_000, 0.00001, 0);
    assert_eq!(big.bit_size(), 4_792_529_189);
    assert_eq!(big.keys(), &[b"big.0".to_vec(), b"big.1".to_vec()]);
    assert_eq!(big.layout().segment_bits(), REDIS_MAX_STRING_BYTES * 8);
}

#[test]
fn test_keys_follow_store_limit() {
    let store = MemoryStore::new().with_max_string_bytes(1024);
    let filter = open(&store, "small", 10_000, 0.01, 0);

    // 95851 bits in 8192-bit segments
    assert_eq!(filter.segment_count(), 12);
    assert_eq!(filter.keys().last().unwrap(), b"small.11");

    let items = words("s", 2000);
    filter.update(&items).unwrap();
    assert_eq!(filter.intersection(&items).unwrap().len(), items.len());
    assert!(store.keys().iter().all(|k| store.string_len(k).unwrap() <= 1024));
}

#[test]
fn test_databases_are_isolated() {
    let store = MemoryStore::new();
    let db0 = open(&store, "iso", 1000, 0.001, 0);
    let db5 = open(&store, "iso", 1000, 0.001, 5);

    db0.update(&words("zero", 20)).unwrap();
    assert!(db5.intersection(&words("zero", 20)).unwrap().is_empty());
    assert_eq!(db5.count_set_bits().unwrap(), 0);
    assert!(db0.count_set_bits().unwrap() > 0);
}

#[test]
fn test_one_round_trip_per_operation() {
    let store = MemoryStore::new().with_max_string_bytes(64);
    let filter = open(&store, "rt", 5000, 0.01, 0);
    assert!(filter.segment_count() > 50);
    let items = words("rt", 500);

    let before = store.round_trips();
    filter.update(&items).unwrap();
    assert_eq!(store.round_trips() - before, 1);

    let before = store.round_trips();
    filter.intersection(&items).unwrap();
    assert_eq!(store.round_trips() - before, 1);

    let before = store.round_trips();
    filter.contains("rt-1").unwrap();
    filter.add("rt-new").unwrap();
    filter.delete().unwrap();
    assert_eq!(store.round_trips() - before, 3);
}

#[test]
fn test_segment_strings_grow_lazily() {
    let store = MemoryStore::new();
    let filter = open(&store, "lazy", 1000, 0.01, 0);
    assert!(!store.contains_key(b"lazy.0"));
    filter.contains("x").unwrap();
    assert!(!store.contains_key(b"lazy.0"));
    filter.add("x").unwrap();
    assert!(store.string_len(b"lazy.0").unwrap() <= filter.bit_size().div_ceil(8));
}

#[test]
fn test_golden_addresses_reach_the_store() {
    // m = 959, k = 7 for (100, 0.01); "" starts at h1 mod m
    let store = MemoryStore::new();
    let filter = open(&store, "g", 100, 0.01, 0);
    filter.add(b"").unwrap();

    let expected = redbloom::hash::addresses(b"", filter.bit_size(), filter.hash_count());
    let mut distinct = expected.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(filter.count_set_bits().unwrap(), distinct.len() as u64);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_no_false_negatives(items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..24), 1..64)) {
        let store = MemoryStore::new().with_max_string_bytes(128);
        let filter = open(&store, "p", 500, 0.01, 0);
        filter.update(&items).unwrap();
        let other = open(&store, "p", 500, 0.01, 0);
        for item in &items {
            prop_assert!(other.contains(item).unwrap());
        }
    }

    #[test]
    fn prop_intersection_equals_filtered_contains(
        added in prop::collection::vec("[a-z]{1,6}", 0..40),
        queried in prop::collection::vec("[a-z]{1,6}", 0..40),
    ) {
        let filter = open(&MemoryStore::new(), "i", 200, 0.05, 0);
        filter.update(&added).unwrap();

        let expected: Vec<String> = queried
            .iter()
            .filter(|q| filter.contains(q.as_str()).unwrap())
            .cloned()
            .collect();
        prop_assert_eq!(filter.intersection(&queried).unwrap(), expected);
    }
}
