//! Uniform operation surface over the tree engines.

use std::fmt;

use serde::{Deserialize, Serialize};
use treebench_core::{Commitment, EngineError, Key};
use treebench_engines::{CommitmentTree, MemStore, VersionedTree};

/// Result of finalizing pending mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub commitment: Commitment,
    /// Saved version for version-tracking engines.
    pub version: Option<u64>,
}

/// Operations the driver performs against a tree engine.
///
/// `insert_ordered` is only correct when the calls for the current batch are
/// ascending by key. Adapters do not check this; what happens on a violation
/// is up to the engine.
pub trait TreeAdapter {
    type Tree;

    fn kind(&self) -> EngineKind;

    fn create_empty(&self) -> Self::Tree;

    fn insert(&self, tree: &mut Self::Tree, key: Key, value: &[u8]) -> Result<(), EngineError>;

    fn insert_ordered(&self, tree: &mut Self::Tree, key: Key, value: &[u8]) -> Result<(), EngineError> {
        self.insert(tree, key, value)
    }

    /// Finalizes pending mutations and computes the root commitment.
    fn commit(&self, tree: &mut Self::Tree) -> Result<Checkpoint, EngineError>;

    fn key_count(&self, tree: &Self::Tree) -> usize;
}

/// Engine selection, resolved to an adapter when a scenario is configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Commitment,
    Versioned,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::Commitment, EngineKind::Versioned];

    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Commitment => "commitment",
            EngineKind::Versioned => "versioned",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Adapter for [`CommitmentTree`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CommitmentAdapter;

impl TreeAdapter for CommitmentAdapter {
    type Tree = CommitmentTree;

    fn kind(&self) -> EngineKind {
        EngineKind::Commitment
    }

    fn create_empty(&self) -> CommitmentTree {
        CommitmentTree::new()
    }

    fn insert(&self, tree: &mut CommitmentTree, key: Key, value: &[u8]) -> Result<(), EngineError> {
        tree.insert(key, value.to_vec())
    }

    fn insert_ordered(&self, tree: &mut CommitmentTree, key: Key, value: &[u8]) -> Result<(), EngineError> {
        tree.insert_ordered(key, value.to_vec())
    }

    fn commit(&self, tree: &mut CommitmentTree) -> Result<Checkpoint, EngineError> {
        Ok(Checkpoint {
            commitment: tree.commit(),
            version: None,
        })
    }

    fn key_count(&self, tree: &CommitmentTree) -> usize {
        tree.len()
    }
}

/// Adapter for [`VersionedTree`], each tree backed by a fresh [`MemStore`].
///
/// Both insert flavours map to `set`; commit maps to `save_version`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VersionedAdapter;

impl VersionedAdapter {
    pub fn versioned_set(&self, tree: &mut VersionedTree, key: Key, value: &[u8]) -> Result<bool, EngineError> {
        tree.set(key, value.to_vec())
    }

    pub fn save_version(&self, tree: &mut VersionedTree) -> Result<u64, EngineError> {
        tree.save_version().map(|(_, version)| version)
    }
}

impl TreeAdapter for VersionedAdapter {
    type Tree = VersionedTree;

    fn kind(&self) -> EngineKind {
        EngineKind::Versioned
    }

    fn create_empty(&self) -> VersionedTree {
        VersionedTree::new(MemStore::new())
    }

    fn insert(&self, tree: &mut VersionedTree, key: Key, value: &[u8]) -> Result<(), EngineError> {
        self.versioned_set(tree, key, value).map(|_| ())
    }

    fn commit(&self, tree: &mut VersionedTree) -> Result<Checkpoint, EngineError> {
        let (commitment, version) = tree.save_version()?;
        Ok(Checkpoint {
            commitment,
            version: Some(version),
        })
    }

    fn key_count(&self, tree: &VersionedTree) -> usize {
        tree.len()
    }
}
