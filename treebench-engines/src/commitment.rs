//! 256-ary commitment trie with lazy hashing.

use std::mem;

use treebench_core::{Commitment, EngineError, Key, KEY_LEN};

use crate::hash::{hash_leaf, BranchHasher};

enum Node {
    Empty,
    Leaf(Leaf),
    Internal(Box<Internal>),
}

struct Leaf {
    key: Key,
    value: Vec<u8>,
    hash: Option<Commitment>,
}

/// Children are sparse, kept sorted by their index byte.
struct Internal {
    children: Vec<(u8, Node)>,
    hash: Option<Commitment>,
}

impl Internal {
    fn new() -> Box<Self> {
        Box::new(Self {
            children: Vec::new(),
            hash: None,
        })
    }

    fn child(&self, index: u8) -> Option<&Node> {
        self.children
            .binary_search_by_key(&index, |(i, _)| *i)
            .ok()
            .map(|pos| &self.children[pos].1)
    }

    fn child_mut(&mut self, index: u8) -> &mut Node {
        let pos = match self.children.binary_search_by_key(&index, |(i, _)| *i) {
            Ok(pos) => pos,
            Err(pos) => {
                self.children.insert(pos, (index, Node::Empty));
                pos
            }
        };
        &mut self.children[pos].1
    }
}

/// Authenticated trie over 32-byte keys.
///
/// A node at depth `d` branches on key byte `d`. A key sits in a leaf at the
/// shallowest depth where no other key shares its prefix, so the shape (and
/// the commitment) is a function of the key set alone.
pub struct CommitmentTree {
    root: Node,
    len: usize,
    last_ordered: Option<Key>,
    committed: Option<Commitment>,
    dirty_leaves: usize,
}

impl Default for CommitmentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitmentTree {
    pub fn new() -> Self {
        Self {
            root: Node::Empty,
            len: 0,
            last_ordered: None,
            committed: None,
            dirty_leaves: 0,
        }
    }

    /// Inserts or overwrites `key`. Hashing is deferred to [`commit`](Self::commit).
    pub fn insert(&mut self, key: Key, value: Vec<u8>) -> Result<(), EngineError> {
        if Self::put(&mut self.root, 0, key, value) {
            self.len += 1;
        }
        self.dirty_leaves += 1;
        Ok(())
    }

    /// Inserts `key` as part of an ascending batch.
    ///
    /// The batch runs until the next commit. A key below the previous one
    /// fails with [`EngineError::OutOfOrder`] and leaves the tree untouched.
    /// Repeating the previous key is an overwrite.
    pub fn insert_ordered(&mut self, key: Key, value: Vec<u8>) -> Result<(), EngineError> {
        if let Some(previous) = &self.last_ordered {
            if key < *previous {
                return Err(EngineError::out_of_order(previous, &key));
            }
        }
        self.last_ordered = Some(key);
        self.insert(key, value)
    }

    /// Hashes every dirty node and returns the root commitment.
    pub fn commit(&mut self) -> Commitment {
        let root = Self::commit_node(&mut self.root);
        tracing::debug!(keys = self.len, dirty = self.dirty_leaves, %root, "commitment tree committed");
        self.dirty_leaves = 0;
        self.last_ordered = None;
        self.committed = Some(root);
        root
    }

    /// Commitment of the last commit, `None` before the first one.
    pub fn root_commitment(&self) -> Option<Commitment> {
        self.committed
    }

    pub fn get(&self, key: &Key) -> Option<&[u8]> {
        let mut node = &self.root;
        for depth in 0..KEY_LEN {
            match node {
                Node::Empty => return None,
                Node::Leaf(leaf) => {
                    return (leaf.key == *key).then_some(leaf.value.as_slice());
                }
                Node::Internal(inner) => match inner.child(key[depth]) {
                    Some(child) => node = child,
                    None => return None,
                },
            }
        }
        match node {
            Node::Leaf(leaf) if leaf.key == *key => Some(leaf.value.as_slice()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true when a new key was added.
    fn put(node: &mut Node, depth: usize, key: Key, value: Vec<u8>) -> bool {
        match node {
            Node::Empty => {
                *node = Node::Leaf(Leaf {
                    key,
                    value,
                    hash: None,
                });
                true
            }
            Node::Leaf(leaf) if leaf.key == key => {
                leaf.value = value;
                leaf.hash = None;
                false
            }
            Node::Leaf(_) => {
                let Node::Leaf(existing) = mem::replace(node, Node::Empty) else {
                    unreachable!()
                };
                let mut inner = Internal::new();
                let slot = existing.key[depth];
                *inner.child_mut(slot) = Node::Leaf(existing);
                Self::put(inner.child_mut(key[depth]), depth + 1, key, value);
                *node = Node::Internal(inner);
                true
            }
            Node::Internal(inner) => {
                inner.hash = None;
                Self::put(inner.child_mut(key[depth]), depth + 1, key, value)
            }
        }
    }

    fn commit_node(node: &mut Node) -> Commitment {
        match node {
            Node::Empty => Commitment::ZERO,
            Node::Leaf(leaf) => *leaf.hash.get_or_insert_with(|| hash_leaf(&leaf.key, &leaf.value)),
            Node::Internal(inner) => {
                if let Some(hash) = inner.hash {
                    return hash;
                }
                let mut hasher = BranchHasher::new();
                for (index, child) in inner.children.iter_mut() {
                    if matches!(child, Node::Empty) {
                        continue;
                    }
                    let child_hash = Self::commit_node(child);
                    hasher.child(*index, &child_hash);
                }
                let hash = hasher.finish();
                inner.hash = Some(hash);
                hash
            }
        }
    }
}
