#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can check
// internal invariants (chain link symmetry, bucket placement) after every
// step.

use crate::map::{AccessError, ChainHashMap};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Emplace(usize, i32),
    Erase(usize),
    EraseAtFound(usize),
    Find(usize),
    Get(usize),
    GetOrDefault(usize),
    Contains(String),
    Mirror,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Emplace(i, v)),
            2 => idx.clone().prop_map(OpI::Erase),
            2 => idx.clone().prop_map(OpI::EraseAtFound),
            2 => idx.clone().prop_map(OpI::Find),
            2 => idx.clone().prop_map(OpI::Get),
            1 => idx.clone().prop_map(OpI::GetOrDefault),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            2 => Just(OpI::Mirror),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap,
// with structural invariants re-validated after every mutation. Invariants
// exercised across random operation sequences:
// - insert reports a true insertion exactly when the model lacked the key;
//   overwrite keeps the count and stores the latest value.
// - emplace matches insert, constructor-built values included.
// - erase (by key and by cursor) removes exactly the model's entry; the
//   cursor form leaves the cursor on the forward successor.
// - find/get/contains parity with the model, including borrowed lookups.
// - forward and reverse traversal are exact mirrors after every step that
//   requests it, and both agree with the model's key set.
// - chain links stay bidirectionally consistent with every node reachable
//   from exactly one bucket (assert_invariants).
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        // A small bucket count keeps chains long so the splice paths get
        // exercised, not just one-node buckets.
        let mut sut: ChainHashMap<String, i32> = ChainHashMap::with_bucket_count(3);
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i].clone();
                    let already = model.contains_key(&k);
                    let (inserted, at) = sut.insert(k.clone(), v);
                    prop_assert_eq!(inserted, !already, "insert reports creation iff key was new");
                    prop_assert_eq!(at.value(&sut), Some(&v));
                    model.insert(k, v);
                }
                OpI::Emplace(i, v) => {
                    let k = pool[i].clone();
                    sut.emplace(k.clone(), || v);
                    model.insert(k, v);
                }
                OpI::Erase(i) => {
                    let k = &pool[i];
                    let existed = model.remove(k.as_str()).is_some();
                    prop_assert_eq!(sut.erase(k.as_str()), existed);
                    prop_assert!(sut.find(k.as_str()).is_empty());
                }
                OpI::EraseAtFound(i) => {
                    let k = &pool[i];
                    let mut c = sut.find(k.as_str());
                    let existed = model.remove(k.as_str()).is_some();
                    prop_assert_eq!(c.is_valid(), existed);
                    prop_assert_eq!(sut.erase_at(&mut c), existed);
                    if existed {
                        // Successor cursor is either valid or the end sentinel.
                        prop_assert!(c.is_valid() || c.is_end());
                    }
                }
                OpI::Find(i) => {
                    let k = &pool[i];
                    let c = sut.find(k.as_str());
                    match model.get(k) {
                        Some(v) => {
                            prop_assert_eq!(c.key(&sut), Some(&pool[i]));
                            prop_assert_eq!(c.value(&sut), Some(v));
                        }
                        None => prop_assert!(c.is_empty()),
                    }
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    match model.get(k) {
                        Some(v) => prop_assert_eq!(sut.get(k.as_str()), Ok(v)),
                        None => prop_assert_eq!(
                            sut.get(k.as_str()),
                            Err(AccessError::KeyNotFound)
                        ),
                    }
                }
                OpI::GetOrDefault(i) => {
                    let k = pool[i].clone();
                    let expected = *model.entry(k.clone()).or_default();
                    prop_assert_eq!(*sut.get_or_default(k), expected);
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
                }
                OpI::Mirror => {
                    let forward: Vec<(String, i32)> =
                        sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    let mut reverse: Vec<(String, i32)> =
                        sut.iter().rev().map(|(k, v)| (k.clone(), *v)).collect();
                    reverse.reverse();
                    prop_assert_eq!(&forward, &reverse, "reverse must mirror forward");
                    let as_map: HashMap<String, i32> = forward.into_iter().collect();
                    prop_assert_eq!(&as_map, &model);
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.cursor_front(), Err(AccessError::EmptyTable));
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            sut.assert_invariants();
        }
    }
}

// Property: a full erase-at sweep from the front empties any table, one
// successor hop at a time.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_erase_at_sweep_drains(keys in proptest::collection::btree_set("[a-z]{1,4}", 0..20)) {
        let mut sut: ChainHashMap<String, usize> = ChainHashMap::with_bucket_count(5);
        for (i, k) in keys.iter().enumerate() {
            sut.insert(k.clone(), i);
        }

        if keys.is_empty() {
            prop_assert_eq!(sut.cursor_front(), Err(AccessError::EmptyTable));
            return Ok(());
        }
        let mut c = sut.cursor_front().unwrap();
        let mut drained = 0;
        while c.is_valid() {
            prop_assert!(sut.erase_at(&mut c));
            drained += 1;
            sut.assert_invariants();
        }
        prop_assert!(c.is_end());
        prop_assert_eq!(drained, keys.len());
        prop_assert!(sut.is_empty());
    }
}
