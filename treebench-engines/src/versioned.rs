//! Versioned authenticated tree over a transient memory store.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use bytes::Bytes;
use treebench_core::{Commitment, EngineError, Key};

use crate::hash::{hash_leaf, hash_pair};

/// Record of a leaf as written by a version save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredLeaf {
    pub version: u64,
    pub value: Bytes,
}

/// Memory-resident backing store for a [`VersionedTree`].
///
/// Keeps the root of every saved version and the latest stored record per key.
#[derive(Debug, Default)]
pub struct MemStore {
    roots: Vec<Commitment>,
    leaves: BTreeMap<Key, StoredLeaf>,
    writes: u64,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root saved for `version` (versions start at 1).
    pub fn root(&self, version: u64) -> Option<Commitment> {
        let index = usize::try_from(version.checked_sub(1)?).ok()?;
        self.roots.get(index).copied()
    }

    pub fn latest_version(&self) -> u64 {
        self.roots.len() as u64
    }

    pub fn leaf(&self, key: &Key) -> Option<&StoredLeaf> {
        self.leaves.get(key)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Total leaf records written across all versions.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn put_leaf(&mut self, version: u64, key: Key, value: Bytes) {
        self.leaves.insert(key, StoredLeaf { version, value });
        self.writes += 1;
    }

    fn put_root(&mut self, version: u64, root: Commitment) {
        debug_assert_eq!(version, self.roots.len() as u64 + 1);
        self.roots.push(root);
    }
}

struct WorkingLeaf {
    value: Bytes,
    hash: Option<Commitment>,
    /// Position in key order as of the last level rebuild.
    slot: usize,
}

/// Working tree whose mutations become durable in the store on [`save_version`](Self::save_version).
///
/// Hash levels of the binary tree are kept between saves. While the key set
/// is unchanged a save rehashes only the paths above edited leaves; adding a
/// key rebuilds every level.
pub struct VersionedTree {
    store: MemStore,
    entries: BTreeMap<Key, WorkingLeaf>,
    dirty: BTreeSet<Key>,
    levels: Vec<Vec<Commitment>>,
    reshaped: bool,
    version: u64,
}

impl VersionedTree {
    /// Opens a working tree on the latest state in `store`.
    pub fn new(store: MemStore) -> Self {
        let entries: BTreeMap<Key, WorkingLeaf> = store
            .leaves
            .iter()
            .map(|(key, leaf)| {
                let working = WorkingLeaf {
                    value: leaf.value.clone(),
                    hash: None,
                    slot: 0,
                };
                (*key, working)
            })
            .collect();
        tracing::debug!(version = store.latest_version(), leaves = store.leaf_count(), "versioned tree opened");
        Self {
            version: store.latest_version(),
            store,
            entries,
            dirty: BTreeSet::new(),
            levels: Vec::new(),
            reshaped: true,
        }
    }

    /// Sets `key` to `value` in the pending version.
    ///
    /// Returns `true` when an existing key was updated.
    pub fn set(&mut self, key: Key, value: impl Into<Bytes>) -> Result<bool, EngineError> {
        let value = value.into();
        if value.is_empty() {
            return Err(EngineError::empty_value(&key));
        }
        self.dirty.insert(key);
        match self.entries.entry(key) {
            btree_map::Entry::Occupied(mut occupied) => {
                let leaf = occupied.get_mut();
                leaf.value = value;
                leaf.hash = None;
                Ok(true)
            }
            btree_map::Entry::Vacant(vacant) => {
                vacant.insert(WorkingLeaf {
                    value,
                    hash: None,
                    slot: 0,
                });
                self.reshaped = true;
                Ok(false)
            }
        }
    }

    /// Writes pending changes to the store and closes the current version.
    pub fn save_version(&mut self) -> Result<(Commitment, u64), EngineError> {
        let next = self
            .version
            .checked_add(1)
            .ok_or_else(|| EngineError::Store("version counter overflow".into()))?;

        let dirty = std::mem::take(&mut self.dirty);
        let mut rehashed = Vec::with_capacity(dirty.len());
        for key in &dirty {
            let leaf = self
                .entries
                .get_mut(key)
                .ok_or_else(|| EngineError::Store("dirty key missing from working set".into()))?;
            let hash = hash_leaf(key, &leaf.value);
            leaf.hash = Some(hash);
            rehashed.push((leaf.slot, hash));
            self.store.put_leaf(next, *key, leaf.value.clone());
        }

        let root = if self.reshaped {
            self.rebuild_levels()
        } else {
            self.update_levels(&rehashed)
        };
        self.reshaped = false;
        self.store.put_root(next, root);
        self.version = next;
        tracing::debug!(version = next, keys = self.entries.len(), dirty = dirty.len(), %root, "version saved");
        Ok((root, next))
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, key: &Key) -> Option<&Bytes> {
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn store(&self) -> &MemStore {
        &self.store
    }

    /// Releases the backing store, dropping unsaved changes.
    pub fn into_store(self) -> MemStore {
        self.store
    }

    fn root(&self) -> Commitment {
        self.levels.last().map_or(Commitment::ZERO, |top| top[0])
    }

    /// Binary Merkle levels over leaves in key order; an odd node pairs with itself.
    fn rebuild_levels(&mut self) -> Commitment {
        let mut leaves = Vec::with_capacity(self.entries.len());
        for (slot, (key, leaf)) in self.entries.iter_mut().enumerate() {
            leaf.slot = slot;
            leaves.push(*leaf.hash.get_or_insert_with(|| hash_leaf(key, &leaf.value)));
        }

        self.levels.clear();
        if leaves.is_empty() {
            return Commitment::ZERO;
        }
        let mut current = leaves;
        while current.len() > 1 {
            let next: Vec<Commitment> = current
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
                .collect();
            self.levels.push(std::mem::replace(&mut current, next));
        }
        self.levels.push(current);
        self.root()
    }

    /// Replaces rehashed leaves and recomputes only their ancestors.
    fn update_levels(&mut self, rehashed: &[(usize, Commitment)]) -> Commitment {
        let mut touched = BTreeSet::new();
        if let Some(leaves) = self.levels.first_mut() {
            for &(slot, hash) in rehashed {
                leaves[slot] = hash;
                touched.insert(slot / 2);
            }
        }

        for depth in 1..self.levels.len() {
            let (lower, upper) = self.levels.split_at_mut(depth);
            let below = &lower[depth - 1];
            let above = &mut upper[0];
            let mut parents = BTreeSet::new();
            for &index in &touched {
                let left = &below[2 * index];
                let right = below.get(2 * index + 1).unwrap_or(left);
                above[index] = hash_pair(left, right);
                parents.insert(index / 2);
            }
            touched = parents;
        }
        self.root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(first: u8) -> Key {
        let mut k = [0u8; 32];
        k[0] = first;
        k
    }

    #[test]
    fn test_save_version_increments_once() {
        let mut tree = VersionedTree::new(MemStore::new());
        assert_eq!(tree.version(), 0);
        tree.set(key(1), vec![1]).unwrap();
        tree.set(key(2), vec![2]).unwrap();
        let (_, v1) = tree.save_version().unwrap();
        assert_eq!(v1, 1);
        let (_, v2) = tree.save_version().unwrap();
        assert_eq!(v2, 2);
        assert_eq!(tree.store().latest_version(), 2);
    }

    #[test]
    fn test_set_reports_update() {
        let mut tree = VersionedTree::new(MemStore::new());
        assert!(!tree.set(key(1), vec![1]).unwrap());
        assert!(tree.set(key(1), vec![2]).unwrap());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&key(1)).map(|b| b.as_ref()), Some(&[2u8][..]));
    }

    #[test]
    fn test_empty_value_rejected() {
        let mut tree = VersionedTree::new(MemStore::new());
        let err = tree.set(key(1), Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyValue(_)));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_store_records_roots_and_dirty_leaves() {
        let mut tree = VersionedTree::new(MemStore::new());
        tree.set(key(1), vec![1]).unwrap();
        tree.set(key(2), vec![2]).unwrap();
        let (r1, _) = tree.save_version().unwrap();
        tree.set(key(2), vec![3]).unwrap();
        let (r2, _) = tree.save_version().unwrap();

        let store = tree.store();
        assert_eq!(store.root(1), Some(r1));
        assert_eq!(store.root(2), Some(r2));
        assert_eq!(store.root(0), None);
        assert_eq!(store.writes(), 3);
        assert_eq!(store.leaf(&key(1)).unwrap().version, 1);
        assert_eq!(store.leaf(&key(2)).unwrap().version, 2);
        assert_ne!(r1, r2);
    }

    #[test]
    fn test_root_independent_of_set_order() {
        let mut a = VersionedTree::new(MemStore::new());
        let mut b = VersionedTree::new(MemStore::new());
        for i in [3u8, 1, 2, 200] {
            a.set(key(i), vec![i]).unwrap();
        }
        for i in [200u8, 2, 1, 3] {
            b.set(key(i), vec![i]).unwrap();
        }
        assert_eq!(a.save_version().unwrap().0, b.save_version().unwrap().0);
    }

    #[test]
    fn test_empty_tree_saves_zero_root() {
        let mut tree = VersionedTree::new(MemStore::new());
        assert_eq!(tree.save_version().unwrap(), (Commitment::ZERO, 1));
    }

    #[test]
    fn test_incremental_root_matches_rebuild() {
        let mut edited = VersionedTree::new(MemStore::new());
        for i in 0..37u8 {
            edited.set(key(i), vec![i, 1]).unwrap();
        }
        edited.save_version().unwrap();
        for i in [0u8, 5, 36] {
            edited.set(key(i), vec![i, 2]).unwrap();
        }
        let (incremental, _) = edited.save_version().unwrap();

        let mut fresh = VersionedTree::new(MemStore::new());
        for i in 0..37u8 {
            let round = if [0u8, 5, 36].contains(&i) { 2 } else { 1 };
            fresh.set(key(i), vec![i, round]).unwrap();
        }
        assert_eq!(fresh.save_version().unwrap().0, incremental);
    }

    #[test]
    fn test_new_key_after_save_reshapes() {
        let mut tree = VersionedTree::new(MemStore::new());
        tree.set(key(2), vec![2]).unwrap();
        tree.save_version().unwrap();
        tree.set(key(1), vec![1]).unwrap();
        let (grown, _) = tree.save_version().unwrap();

        let mut fresh = VersionedTree::new(MemStore::new());
        fresh.set(key(1), vec![1]).unwrap();
        fresh.set(key(2), vec![2]).unwrap();
        assert_eq!(fresh.save_version().unwrap().0, grown);
    }

    #[test]
    fn test_reopen_resumes_latest_state() {
        let mut tree = VersionedTree::new(MemStore::new());
        for i in 1..=4u8 {
            tree.set(key(i), vec![i]).unwrap();
        }
        tree.save_version().unwrap();
        tree.set(key(3), vec![30]).unwrap();
        let (saved, _) = tree.save_version().unwrap();

        let store = tree.into_store();
        assert_eq!(store.leaf_count(), 4);
        let mut reopened = VersionedTree::new(store);
        assert_eq!(reopened.version(), 2);
        assert_eq!(reopened.len(), 4);
        assert_eq!(reopened.get(&key(3)).map(|b| b.as_ref()), Some(&[30u8][..]));
        assert_eq!(reopened.save_version().unwrap(), (saved, 3));
    }
}
