use sha2::{Digest, Sha256};
use treebench_core::{Commitment, Key};

const LEAF_TAG: u8 = 0x00;
const INTERNAL_TAG: u8 = 0x01;

pub(crate) fn hash_leaf(key: &Key, value: &[u8]) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_TAG]);
    hasher.update(key);
    hasher.update((value.len() as u32).to_be_bytes());
    hasher.update(value);
    Commitment(hasher.finalize().into())
}

pub(crate) fn hash_pair(left: &Commitment, right: &Commitment) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update([INTERNAL_TAG]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Commitment(hasher.finalize().into())
}

/// Hasher for a node whose children are addressed by a single index byte.
pub(crate) struct BranchHasher(Sha256);

impl BranchHasher {
    pub(crate) fn new() -> Self {
        let mut hasher = Sha256::new();
        hasher.update([INTERNAL_TAG]);
        Self(hasher)
    }

    pub(crate) fn child(&mut self, index: u8, hash: &Commitment) {
        self.0.update([index]);
        self.0.update(hash.as_bytes());
    }

    pub(crate) fn finish(self) -> Commitment {
        Commitment(self.0.finalize().into())
    }
}
