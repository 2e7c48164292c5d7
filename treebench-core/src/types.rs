//! Core type definitions for treebench.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length in bytes of every workload key.
pub const KEY_LEN: usize = 32;

/// Fixed-length tree key.
pub type Key = [u8; KEY_LEN];

/// 32-byte root commitment produced by a tree commit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != 32 {
            return None;
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(slice);
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Commitment {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// One key/value entry of a workload.
///
/// Keys are not deduplicated; nothing downstream relies on uniqueness.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: Key,
    pub value: Vec<u8>,
}

impl KeyValuePair {
    pub fn new(key: Key, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Order in which a workload is presented to a tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingMode {
    #[default]
    Random,
    SortedByKey,
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingMode::Random => f.write_str("random"),
            OrderingMode::SortedByKey => f.write_str("sorted-by-key"),
        }
    }
}

/// Ordered sequence of pairs plus the ordering it was arranged in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub pairs: Vec<KeyValuePair>,
    pub ordering: OrderingMode,
}

impl Workload {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyValuePair> {
        self.pairs.iter()
    }
}

impl<'a> IntoIterator for &'a Workload {
    type Item = &'a KeyValuePair;
    type IntoIter = std::slice::Iter<'a, KeyValuePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Size parameters of one scenario run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub tree_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_batch_size: Option<usize>,
}

impl ScenarioParams {
    pub fn tree(tree_size: usize) -> Self {
        Self {
            tree_size,
            edit_batch_size: None,
        }
    }

    pub fn with_edits(tree_size: usize, edit_batch_size: usize) -> Self {
        Self {
            tree_size,
            edit_batch_size: Some(edit_batch_size),
        }
    }

    /// Divides every size by `factor`, never going below one.
    pub fn scaled_down(self, factor: usize) -> Self {
        let factor = factor.max(1);
        Self {
            tree_size: (self.tree_size / factor).max(1),
            edit_batch_size: self.edit_batch_size.map(|n| (n / factor).max(1)),
        }
    }
}

impl fmt::Display for ScenarioParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree_size={}", self.tree_size)?;
        if let Some(edits) = self.edit_batch_size {
            write!(f, " edit_batch_size={}", edits)?;
        }
        Ok(())
    }
}
