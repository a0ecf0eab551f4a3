// ChainedHashMap property tests against the public API.
//
// Property 1: round-trip and size.
//  - For any list of (k, v) pairs, after inserting them in order every key
//    maps to the last value written for it and len() equals the number of
//    distinct keys.
//
// Property 2: bulk copy.
//  - For source S and destination D, after D.put_all(&S): every key of S
//    reads S's value from D, keys only in D keep their value, and S is
//    unchanged.
//
// Property 3: view consistency.
//  - entry_set() has len() entries; each (key, value) matches get(key);
//    key_set()/values() are positionally aligned with entry_set().
use chained_hashmap::ChainedHashMap;
use proptest::prelude::*;
use std::collections::HashMap;

fn arb_pairs() -> impl Strategy<Value = Vec<(u16, i64)>> {
    proptest::collection::vec((0u16..512, any::<i64>()), 0..400)
}

proptest! {
    #[test]
    fn prop_round_trip_and_size(pairs in arb_pairs()) {
        let mut m: ChainedHashMap<u16, i64> = ChainedHashMap::new();
        let mut model: HashMap<u16, i64> = HashMap::new();
        for (k, v) in &pairs {
            let prev = m.insert(*k, *v);
            prop_assert_eq!(prev, model.insert(*k, *v));
            prop_assert_eq!(m.get(k), Some(v));
        }
        prop_assert_eq!(m.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(m.get(k), Some(v));
        }
    }
}

proptest! {
    #[test]
    fn prop_put_all(dst_pairs in arb_pairs(), src_pairs in arb_pairs()) {
        let mut dst: ChainedHashMap<u16, i64> = dst_pairs.iter().copied().collect();
        let src: ChainedHashMap<u16, i64> = src_pairs.iter().copied().collect();
        let dst_before: HashMap<u16, i64> = dst.iter().map(|(_, k, v)| (*k, *v)).collect();
        let src_before: HashMap<u16, i64> = src.iter().map(|(_, k, v)| (*k, *v)).collect();

        dst.put_all(&src);

        for (_, k, v) in src.iter() {
            prop_assert_eq!(dst.get(k), Some(v));
        }
        for (k, v) in &dst_before {
            if !src.contains_key(k) {
                prop_assert_eq!(dst.get(k), Some(v));
            }
        }
        let expected_len = dst_before
            .keys()
            .filter(|k| !src_before.contains_key(*k))
            .count()
            + src_before.len();
        prop_assert_eq!(dst.len(), expected_len);

        let src_after: HashMap<u16, i64> = src.iter().map(|(_, k, v)| (*k, *v)).collect();
        prop_assert_eq!(src_after, src_before);
    }
}

proptest! {
    #[test]
    fn prop_views_consistent(pairs in arb_pairs(), removals in proptest::collection::vec(0u16..512, 0..100)) {
        let mut m: ChainedHashMap<u16, i64> = pairs.into_iter().collect();
        for k in removals {
            let _ = m.remove(&k);
        }

        let entries = m.entry_set();
        let keys = m.key_set();
        let values = m.values();
        prop_assert_eq!(entries.len(), m.len());
        prop_assert_eq!(keys.len(), m.len());
        prop_assert_eq!(values.len(), m.len());
        for (i, e) in entries.iter().enumerate() {
            prop_assert_eq!(m.get(e.key()), Some(e.value()));
            prop_assert_eq!(keys[i], e.key());
            prop_assert_eq!(values[i], e.value());
        }
    }
}
