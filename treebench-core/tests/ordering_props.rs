use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use treebench_core::{generate, is_sorted_by_key, KeyValuePair, OrderedWorkloads};

fn sorted_multiset(pairs: &[KeyValuePair]) -> Vec<KeyValuePair> {
    let mut v = pairs.to_vec();
    v.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.value.cmp(&b.value)));
    v
}

proptest! {
    #[test]
    fn sorted_is_permutation_of_random(seed in any::<u64>(), n in 0usize..200, value_len in 0usize..40) {
        let pairs = generate(&mut StdRng::seed_from_u64(seed), n, value_len);
        let both = OrderedWorkloads::derive(pairs.clone());

        prop_assert_eq!(both.random.pairs.as_slice(), pairs.as_slice());
        prop_assert_eq!(both.sorted.len(), n);
        prop_assert!(is_sorted_by_key(&both.sorted.pairs));
        prop_assert_eq!(sorted_multiset(&both.sorted.pairs), sorted_multiset(&pairs));
    }

    #[test]
    fn sorting_handles_duplicate_keys(first_bytes in prop::collection::vec(0u8..4, 0..50)) {
        let pairs: Vec<KeyValuePair> = first_bytes
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let mut key = [0u8; 32];
                key[0] = *b;
                KeyValuePair::new(key, vec![i as u8])
            })
            .collect();
        let both = OrderedWorkloads::derive(pairs.clone());

        prop_assert!(is_sorted_by_key(&both.sorted.pairs));
        prop_assert_eq!(sorted_multiset(&both.sorted.pairs), sorted_multiset(&pairs));
        // Stable: equal keys keep their generation order.
        for w in both.sorted.pairs.windows(2) {
            if w[0].key == w[1].key {
                prop_assert!(w[0].value[0] < w[1].value[0]);
            }
        }
    }
}
