// ObjectArena integration suite.
//
// Each test documents the behavior verified. The core invariants exercised:
// - Uniqueness: every add returns a key never returned before.
// - Round trip: get(add(v)) == v until the key is removed.
// - Unassigned keys: get/remove/dup fail with the offending key and leave
//   the arena untouched.
// - Growth: no entry is lost or misassigned across a rehash.
// - Independence: separate arenas never observe each other's mutations.
// - Concurrency: calls from many threads behave as if serialized.
use object_arena::{ArenaConfig, ArenaError, Key, ObjectArena};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use test_log::test;

fn unassigned(key: Key) -> ArenaError {
    ArenaError::UnassignedKey { key }
}

// Test: the basic add/get/remove scenario.
// Verifies: removing one key leaves the other reachable and size is updated.
#[test]
fn add_get_remove_scenario() {
    let arena = ObjectArena::new();
    let k1 = arena.add("x").unwrap();
    let k2 = arena.add("y").unwrap();
    assert_ne!(k1, k2);
    assert_eq!(arena.get(k1), Ok("x"));

    assert_eq!(arena.remove(k1), Ok("x"));
    assert_eq!(arena.get(k1), Err(unassigned(k1)));
    assert_eq!(arena.get(k2), Ok("y"));
    assert_eq!(arena.size(), 1);
}

// Test: create produces distinct, empty arenas.
// Verifies: mutations on one arena are not visible through the other.
#[test]
fn arenas_are_independent() {
    let a1: ObjectArena<String> = ObjectArena::new();
    let a2: ObjectArena<String> = ObjectArena::default();
    assert_eq!(a1.size(), 0);
    assert_eq!(a2.size(), 0);
    assert!(a1.is_empty() && a2.is_empty());
    assert!(!std::ptr::eq(&a1, &a2));

    let k = a1.add("only in a1".to_string()).unwrap();
    assert_eq!(a1.size(), 1);
    assert_eq!(a2.size(), 0);
    assert_eq!(a2.get(k), Err(unassigned(k)));

    // Both arenas hand out the same first key independently.
    let k2 = a2.add("a2".to_string()).unwrap();
    assert_eq!(k, k2);
    assert_eq!(a1.get(k).unwrap(), "only in a1");
    assert_eq!(a2.get(k2).unwrap(), "a2");
}

// Test: unassigned keys on a fresh arena, including key 0.
// Verifies: error carries the key and renders "key is not assigned: <k>".
#[test]
fn unassigned_keys_on_fresh_arena() {
    let arena: ObjectArena<u32> = ObjectArena::new();
    for raw in [0, 1, 5, -3, i32::MAX] {
        let k = Key::from_raw(raw);
        let get = arena.get(k).unwrap_err();
        assert_eq!(get.to_string(), format!("key is not assigned: {raw}"));
        assert_eq!(arena.remove(k), Err(unassigned(k)));
        assert_eq!(arena.dup(k), Err(unassigned(k)));
    }
    assert!(arena.is_empty());
    // The failed dup calls did not consume keys.
    assert_eq!(arena.add(1).unwrap().get(), 0);
}

// Test: keys that were removed behave like never-issued keys.
#[test]
fn removed_keys_are_unassigned() {
    let arena = ObjectArena::new();
    let keys: Vec<Key> = (0..10u32).map(|v| arena.add(v).unwrap()).collect();
    for k in &keys {
        arena.remove(*k).unwrap();
    }
    for k in &keys {
        assert_eq!(arena.get(*k), Err(unassigned(*k)));
        assert_eq!(arena.remove(*k), Err(unassigned(*k)));
        assert_eq!(arena.dup(*k), Err(unassigned(*k)));
        assert_eq!(
            arena.remove(*k).unwrap_err().to_string(),
            format!("key is not assigned: {k}")
        );
    }
    assert_eq!(arena.size(), 0);
}

// Test: inserting past the default growth threshold (4 elements at 0.75,
// i.e. 8 slots growing at 6 occupied) keeps every entry.
#[test]
fn growth_across_default_threshold() {
    let arena = ObjectArena::new();
    assert_eq!(arena.capacity(), 8);
    let keys: Vec<Key> = (0..20).map(|i| arena.add(format!("v{i}")).unwrap()).collect();
    assert!(arena.capacity() > 8);
    assert_eq!(arena.size(), 20);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(arena.get(*k).unwrap(), format!("v{i}"));
    }
    let unique: HashSet<Key> = keys.iter().copied().collect();
    assert_eq!(unique.len(), keys.len());
}

// Test: volume. 100k adds succeed, keys are unique, size tracks count.
#[test]
fn volume_hundred_thousand_adds() {
    let arena = ObjectArena::new();
    let mut seen = HashSet::with_capacity(100_000);
    for i in 0..100_000u32 {
        let k = arena.add(i).unwrap();
        assert!(seen.insert(k), "key {k} returned twice");
    }
    assert_eq!(arena.size(), 100_000);
    for k in seen.iter().step_by(97) {
        assert_eq!(arena.get(*k), Ok(k.get() as u32));
    }
}

// Test: removing a large, scattered subset after growth.
// Verifies: shift-deletion never orphans a surviving entry.
#[test]
fn bulk_removal_keeps_survivors() {
    let arena = ObjectArena::new();
    let keys: Vec<Key> = (0..50_000u32).map(|i| arena.add(i).unwrap()).collect();
    let removed: HashSet<Key> = keys
        .iter()
        .copied()
        .filter(|k| k.get() % 5 != 0 && k.get() % 3 != 1)
        .collect();
    for k in &removed {
        arena.remove(*k).unwrap();
    }
    assert_eq!(arena.size(), keys.len() - removed.len());
    for k in &keys {
        if removed.contains(k) {
            assert!(!arena.contains_key(*k));
        } else {
            assert_eq!(arena.get(*k), Ok(k.get() as u32));
        }
    }
}

// Test: dup yields a fresh key for the same object.
#[test]
fn dup_returns_new_key_for_same_value() {
    let arena = ObjectArena::new();
    let obj = Arc::new("shared".to_string());
    let k1 = arena.add(Arc::clone(&obj)).unwrap();
    let k2 = arena.dup(k1).unwrap();
    assert_ne!(k1, k2);
    assert!(Arc::ptr_eq(&arena.get(k2).unwrap(), &obj));
    assert_eq!(Arc::strong_count(&obj), 3);

    // Removal drops the arena's reference.
    drop(arena.remove(k1).unwrap());
    drop(arena.remove(k2).unwrap());
    assert_eq!(Arc::strong_count(&obj), 1);
}

// Test: dropping the arena drops every stored value.
#[test]
fn drop_releases_stored_values() {
    let obj = Arc::new(0u8);
    {
        let arena = ObjectArena::new();
        for _ in 0..100 {
            arena.add(Arc::clone(&obj)).unwrap();
        }
        assert_eq!(Arc::strong_count(&obj), 101);
    }
    assert_eq!(Arc::strong_count(&obj), 1);
}

// Test: explicit sizing avoids growth up to the expected element count.
#[test]
fn with_config_presizes() {
    let cfg = ArenaConfig::new().with_expected_elements(1_000).with_load_factor(0.5);
    let arena = ObjectArena::with_config(cfg).unwrap();
    let before = arena.capacity();
    for i in 0..1_000 {
        arena.add(i).unwrap();
    }
    assert_eq!(arena.capacity(), before);
}

// Test: out-of-range load factors are rejected at construction.
#[test]
fn invalid_load_factor_is_configuration_error() {
    for lf in [0.0, 0.005, 0.999, 1.0, f64::NAN] {
        let res = ObjectArena::<()>::with_config(ArenaConfig::new().with_load_factor(lf));
        assert!(
            matches!(res, Err(ArenaError::InvalidLoadFactor { .. })),
            "load factor {lf} accepted"
        );
    }
}

// Test: concurrent add/get/dup/remove from many threads.
// Verifies: all returned keys are unique and every surviving entry holds
// the value its thread stored.
#[test]
fn concurrent_mixed_operations() {
    let arena = Arc::new(ObjectArena::new());
    let threads = 8usize;
    let per_thread = 5_000usize;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let arena = Arc::clone(&arena);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut issued = Vec::new();
                let mut live = Vec::new();
                for i in 0..per_thread {
                    let v = t * per_thread + i;
                    let k = arena.add(v).unwrap();
                    issued.push(k);
                    assert_eq!(arena.get(k), Ok(v));
                    match i % 4 {
                        0 => arena.remove(k).map(|_| ()).unwrap(),
                        1 => {
                            let d = arena.dup(k).unwrap();
                            issued.push(d);
                            live.push((k, v));
                            live.push((d, v));
                        }
                        _ => live.push((k, v)),
                    }
                }
                (issued, live)
            })
        })
        .collect();

    let mut all_issued = HashSet::new();
    let mut all_live = Vec::new();
    for h in handles {
        let (issued, live) = h.join().unwrap();
        for k in issued {
            assert!(all_issued.insert(k), "key {k} issued twice");
        }
        all_live.extend(live);
    }
    assert_eq!(arena.size(), all_live.len());
    for (k, v) in all_live {
        assert_eq!(arena.get(k), Ok(v));
    }
}
