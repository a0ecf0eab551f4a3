#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can call
// the structural invariant checker.

use crate::chained_hash_map::ChainedHashMap;
use crate::error::RemoveError;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Views,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Views),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs `ops` against `sut` and a std HashMap model, checking after every op:
// - `insert` returns the model's previous value; `get`/`contains_key` agree.
// - `remove` returns the model's value or KeyNotFound, and the key is gone.
// - views have `len` entries, distinct keys, aligned key/value positions.
// - `len`/`is_empty` parity and the structural invariants of the table.
fn run_scenario<S>(
    mut sut: ChainedHashMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let prev = sut.insert(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                match (sut.remove(&k), model.remove(&k)) {
                    (Ok(v), Some(mv)) => prop_assert_eq!(v, mv),
                    (Err(RemoveError::KeyNotFound), None) => {}
                    (got, want) => {
                        prop_assert!(false, "remove mismatch: {:?} vs {:?}", got, want)
                    }
                }
                prop_assert!(sut.get(&k).is_none(), "removed key still reachable");
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(vr) = sut.get_mut(&k) {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(&k).expect("present in model");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Views => {
                let keys = sut.key_set();
                let values = sut.values();
                prop_assert_eq!(keys.len(), model.len());
                prop_assert_eq!(values.len(), model.len());
                for (k, v) in keys.iter().zip(values.iter()) {
                    prop_assert_eq!(model.get(*k), Some(*v));
                }
                let s_keys: BTreeSet<_> = keys.into_iter().cloned().collect();
                prop_assert_eq!(s_keys.len(), model.len());
                let entries: BTreeMap<_, _> = sut
                    .entry_set()
                    .into_iter()
                    .map(|e| (e.key().clone(), *e.value()))
                    .collect();
                let m_entries: BTreeMap<_, _> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(entries, m_entries);
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.check_invariants();
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap,
// starting from a small table so growth happens within a scenario.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: ChainedHashMap<Key, i32> =
            ChainedHashMap::with_capacity_and_load_factor(2, 0.75).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain walking and splicing.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same invariants as above with every key in one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut: ChainedHashMap<Key, i32, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        run_scenario(sut, &pool, ops)?;
    }
}

// Property: load factor and initial capacity never affect contents.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_config_independent(
        shift in 0u32..6,
        lf in prop_oneof![Just(0.25f64), Just(0.5), Just(0.75), Just(1.0)],
        (pool, ops) in arb_scenario(),
    ) {
        let sut: ChainedHashMap<Key, i32> =
            ChainedHashMap::with_capacity_and_load_factor(1 << shift, lf).unwrap();
        prop_assert_eq!(sut.load_factor(), lf);
        run_scenario(sut, &pool, ops)?;
    }
}
