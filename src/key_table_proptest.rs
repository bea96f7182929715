#![cfg(test)]

// Property tests for KeyTable kept inside the crate so they can check
// structural invariants that are not part of the public API.

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::key::Key;
use crate::key_table::KeyTable;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// Operations address previously issued keys by index into the issue log, so
// they shrink toward early keys and hit both live and removed keys.
#[derive(Clone, Debug)]
enum Op {
    Add(u16),
    Remove(usize),
    Get(usize),
    Dup(usize),
    Foreign(i32),
    Iterate,
}

fn arb_ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => any::<u16>().prop_map(Op::Add),
        3 => any::<usize>().prop_map(Op::Remove),
        2 => any::<usize>().prop_map(Op::Get),
        1 => any::<usize>().prop_map(Op::Dup),
        1 => any::<i32>().prop_map(Op::Foreign),
        1 => Just(Op::Iterate),
    ];
    proptest::collection::vec(op, 1..max_len)
}

fn pick(issued: &[Key], i: usize) -> Option<Key> {
    if issued.is_empty() {
        None
    } else {
        Some(issued[i % issued.len()])
    }
}

// State-machine equivalence against a BTreeMap model:
// - every add returns a key greater than all previous keys;
// - get/remove/dup agree with the model, unassigned keys produce
//   UnassignedKey carrying the key, and failures change nothing;
// - len/is_empty parity and structural invariants after every op.
fn run_state_machine(mut sut: KeyTable<u16>, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<Key, u16> = BTreeMap::new();
    let mut issued: Vec<Key> = Vec::new();

    for op in ops {
        match op {
            Op::Add(v) => {
                let k = sut.insert(v).expect("growth within limits");
                if let Some(&last) = issued.last() {
                    prop_assert!(k > last, "keys must increase");
                }
                issued.push(k);
                model.insert(k, v);
            }
            Op::Remove(i) => {
                if let Some(k) = pick(&issued, i) {
                    match model.remove(&k) {
                        Some(v) => prop_assert_eq!(sut.remove(k), Ok(v)),
                        None => prop_assert_eq!(
                            sut.remove(k),
                            Err(ArenaError::UnassignedKey { key: k })
                        ),
                    }
                }
            }
            Op::Get(i) => {
                if let Some(k) = pick(&issued, i) {
                    let expected = model.get(&k).ok_or(ArenaError::UnassignedKey { key: k });
                    prop_assert_eq!(sut.get(k), expected);
                }
            }
            Op::Dup(i) => {
                if let Some(k) = pick(&issued, i) {
                    match model.get(&k).copied() {
                        Some(v) => {
                            let copy = *sut.get(k).expect("live key resolves");
                            let nk = sut.insert(copy).expect("growth within limits");
                            issued.push(nk);
                            model.insert(nk, v);
                        }
                        None => prop_assert!(sut.get(k).is_err()),
                    }
                }
            }
            Op::Foreign(raw) => {
                let k = Key::from_raw(raw);
                let issued_before = issued.last().is_some_and(|last| raw <= last.get());
                if !(raw >= 0 && issued_before) {
                    prop_assert!(!sut.contains_key(k));
                    prop_assert_eq!(sut.remove(k), Err(ArenaError::UnassignedKey { key: k }));
                }
            }
            Op::Iterate => {
                let s: BTreeSet<(Key, u16)> = sut.iter().map(|(k, v)| (k, *v)).collect();
                let m: BTreeSet<(Key, u16)> = model.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(s, m);
            }
        }

        sut.check_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }

    // Every issued key still resolves exactly as the model says.
    for k in issued {
        prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops(200)) {
        run_state_machine(KeyTable::new(), ops)?;
    }
}

// Same invariants on a table that starts at the minimum size with the
// highest allowed load factor, so nearly every insert collides and removals
// exercise long backward-shift chains and wraparound.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_dense_table(ops in arb_ops(400)) {
        let cfg = ArenaConfig::new().with_expected_elements(0).with_load_factor(0.99);
        run_state_machine(KeyTable::with_config(cfg).unwrap(), ops)?;
    }
}

// Removing an arbitrary subset from a dense table keeps every survivor
// reachable and every removed key unassigned.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_remove_subset_keeps_survivors(
        n in 1usize..600,
        mask in proptest::collection::vec(any::<bool>(), 600),
    ) {
        let cfg = ArenaConfig::new().with_expected_elements(0).with_load_factor(0.99);
        let mut t = KeyTable::with_config(cfg).unwrap();
        let keys: Vec<Key> = (0..n).map(|i| t.insert(i).unwrap()).collect();

        for (i, k) in keys.iter().enumerate() {
            if mask[i] {
                prop_assert_eq!(t.remove(*k), Ok(i));
            }
        }
        t.check_invariants();
        for (i, k) in keys.iter().enumerate() {
            if mask[i] {
                prop_assert_eq!(t.get(*k), Err(ArenaError::UnassignedKey { key: *k }));
            } else {
                prop_assert_eq!(t.get(*k), Ok(&i));
            }
        }
    }
}
