//! In-memory authenticated tree engines.
//!
//! [`CommitmentTree`] is a 256-ary trie that defers all hashing to `commit`.
//! [`VersionedTree`] keeps a sorted working set over a [`MemStore`] and
//! checkpoints it with `save_version`.

mod hash;
pub mod commitment;
pub mod versioned;

pub use commitment::CommitmentTree;
pub use versioned::{MemStore, VersionedTree};
