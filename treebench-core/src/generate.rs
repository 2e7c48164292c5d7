//! Uniform random key/value generation.

use rand::RngCore;

use crate::types::{Key, KeyValuePair, KEY_LEN};

/// Value length used by the bulk-load scenarios.
pub const GENERIC_VALUE_LEN: usize = 32;

/// Value length of the initial load in steady-state edit scenarios.
pub const INITIAL_EDIT_VALUE_LEN: usize = 1;

/// Value length of the payload written by each steady-state edit.
pub const EDIT_PAYLOAD_LEN: usize = 4;

/// Number of direct children of a node at the shallowest branching level.
pub const FULL_FANOUT: usize = 256;

/// Payload stored under every full fan-out key: `0x40` followed by zeros.
pub const FANOUT_VALUE: [u8; 32] = {
    let mut v = [0u8; 32];
    v[0] = 0x40;
    v
};

/// Draws one uniformly random key.
pub fn random_key<R: RngCore + ?Sized>(rng: &mut R) -> Key {
    let mut key = [0u8; KEY_LEN];
    rng.fill_bytes(&mut key);
    key
}

/// Draws `n` uniformly random keys. Duplicates are not filtered.
pub fn random_keys<R: RngCore + ?Sized>(rng: &mut R, n: usize) -> Vec<Key> {
    (0..n).map(|_| random_key(rng)).collect()
}

/// Generates `n` pairs with independent random keys and `value_len`-byte random values.
pub fn generate<R: RngCore + ?Sized>(rng: &mut R, n: usize, value_len: usize) -> Vec<KeyValuePair> {
    let mut pairs = Vec::with_capacity(n);
    for _ in 0..n {
        let key = random_key(rng);
        let mut value = vec![0u8; value_len];
        rng.fill_bytes(&mut value);
        pairs.push(KeyValuePair { key, value });
    }
    pairs
}

/// Keys that differ only in their highest-order byte, `0..width`.
///
/// # Panics
///
/// Panics if `width` exceeds [`FULL_FANOUT`].
pub fn fanout_keys(width: usize) -> Vec<Key> {
    assert!(width <= FULL_FANOUT, "fan-out width must be at most 256");
    (0..width)
        .map(|i| {
            let mut key = [0u8; KEY_LEN];
            key[0] = i as u8;
            key
        })
        .collect()
}

/// Full fan-out workload pairs: [`fanout_keys`] each mapped to [`FANOUT_VALUE`].
pub fn fanout_pairs(width: usize) -> Vec<KeyValuePair> {
    fanout_keys(width)
        .into_iter()
        .map(|key| KeyValuePair::new(key, FANOUT_VALUE))
        .collect()
}

/// Big-endian edit payload for steady-state iteration `i`.
pub fn edit_payload(i: u32) -> [u8; EDIT_PAYLOAD_LEN] {
    i.to_be_bytes()
}
