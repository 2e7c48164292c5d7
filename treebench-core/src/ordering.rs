//! Workload ordering strategy.
//!
//! This is the only place that establishes the ascending-key precondition of
//! ordered inserts. Adapters pass keys through without re-checking.

use crate::types::{KeyValuePair, OrderingMode, Workload};

/// Arranges `pairs` according to `mode`.
///
/// `Random` keeps the input order. `SortedByKey` is a stable byte-lexicographic
/// sort on the key, so duplicate keys keep their relative order.
pub fn order(mut pairs: Vec<KeyValuePair>, mode: OrderingMode) -> Workload {
    if mode == OrderingMode::SortedByKey {
        pairs.sort_by(|a, b| a.key.cmp(&b.key));
    }
    Workload {
        pairs,
        ordering: mode,
    }
}

/// True when keys are non-decreasing.
pub fn is_sorted_by_key(pairs: &[KeyValuePair]) -> bool {
    pairs.windows(2).all(|w| w[0].key <= w[1].key)
}

/// Both orderings of a single generated pair set.
#[derive(Clone, Debug)]
pub struct OrderedWorkloads {
    pub random: Workload,
    pub sorted: Workload,
}

impl OrderedWorkloads {
    /// Derives the random and sorted workloads from one generation pass.
    pub fn derive(pairs: Vec<KeyValuePair>) -> Self {
        let sorted = order(pairs.clone(), OrderingMode::SortedByKey);
        let random = order(pairs, OrderingMode::Random);
        Self { random, sorted }
    }

    pub fn get(&self, mode: OrderingMode) -> &Workload {
        match mode {
            OrderingMode::Random => &self.random,
            OrderingMode::SortedByKey => &self.sorted,
        }
    }
}
