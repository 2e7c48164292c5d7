use proptest::prelude::*;
use treebench_core::{Key, KeyValuePair};
use treebench_engines::{CommitmentTree, MemStore, VersionedTree};

fn pairs_strategy() -> impl Strategy<Value = Vec<KeyValuePair>> {
    prop::collection::vec(
        (prop::array::uniform32(any::<u8>()), prop::collection::vec(any::<u8>(), 1..8)),
        0..64,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(key, value)| KeyValuePair::new(key, value))
            .collect()
    })
}

/// Keeps the last value written per key, matching overwrite semantics.
fn dedup_last(pairs: &[KeyValuePair]) -> Vec<KeyValuePair> {
    let mut map: std::collections::BTreeMap<Key, Vec<u8>> = Default::default();
    for p in pairs {
        map.insert(p.key, p.value.clone());
    }
    map.into_iter().map(|(k, v)| KeyValuePair::new(k, v)).collect()
}

proptest! {
    #[test]
    fn commitment_ignores_insertion_order(pairs in pairs_strategy()) {
        let unique = dedup_last(&pairs);

        let mut forward = CommitmentTree::new();
        for p in &unique {
            forward.insert(p.key, p.value.clone()).unwrap();
        }
        let mut reverse = CommitmentTree::new();
        for p in unique.iter().rev() {
            reverse.insert(p.key, p.value.clone()).unwrap();
        }

        prop_assert_eq!(forward.commit(), reverse.commit());
        prop_assert_eq!(forward.len(), unique.len());
    }

    #[test]
    fn ordered_insert_matches_plain_insert(pairs in pairs_strategy()) {
        let mut sorted = pairs.clone();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));

        let mut plain = CommitmentTree::new();
        for p in &pairs {
            plain.insert(p.key, p.value.clone()).unwrap();
        }
        let mut ordered = CommitmentTree::new();
        for p in &sorted {
            ordered.insert_ordered(p.key, p.value.clone()).unwrap();
        }

        // The sort is stable, so the last write per key is the same in both sequences.
        prop_assert_eq!(plain.commit(), ordered.commit());
        prop_assert_eq!(plain.len(), ordered.len());
    }

    #[test]
    fn versioned_root_ignores_set_order(pairs in pairs_strategy()) {
        let unique = dedup_last(&pairs);

        let mut forward = VersionedTree::new(MemStore::new());
        for p in &unique {
            forward.set(p.key, p.value.clone()).unwrap();
        }
        let mut reverse = VersionedTree::new(MemStore::new());
        for p in unique.iter().rev() {
            reverse.set(p.key, p.value.clone()).unwrap();
        }

        prop_assert_eq!(forward.save_version().unwrap(), reverse.save_version().unwrap());
    }
}
