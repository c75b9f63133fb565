// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! Map specializations for digest-derived keys.
//!
//! Addresses and identifiers are blake3 digests, already uniformly
//! distributed, so hash tables keyed by them reuse the trailing key bytes
//! instead of hashing a hash again.

use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasherDefault, Hasher};

/// Hasher that keeps the trailing eight bytes of the last write.
///
/// Only meaningful for digest-derived keys (`Address`, `TransactionId`,
/// `BlockId`): their final write is the digest itself, so the table index
/// ends up being the digest tail.
#[derive(Default)]
pub struct DigestTailHasher(u64);

impl Hasher for DigestTailHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() >= 8, "digest-derived keys write at least 8 bytes");
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&bytes[bytes.len() - 8..]);
        self.0 = u64::from_ne_bytes(tail);
    }
}

/// `HashMap` keyed by an address or identifier
pub type DigestMap<K, V> = HashMap<K, V, BuildHasherDefault<DigestTailHasher>>;

/// `HashSet` of addresses or identifiers
pub type DigestSet<T> = HashSet<T, BuildHasherDefault<DigestTailHasher>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionId;
    use ember_hash::Hash;

    #[test]
    fn digest_keyed_tables_behave() {
        let a = TransactionId(Hash::compute_from(b"a"));
        let b = TransactionId(Hash::compute_from(b"b"));

        let mut map: DigestMap<TransactionId, u64> = Default::default();
        map.insert(a, 1);
        map.insert(b, 2);
        assert_eq!(map.get(&a), Some(&1));
        assert_eq!(map.get(&b), Some(&2));

        let mut set: DigestSet<TransactionId> = Default::default();
        set.insert(a);
        assert!(set.contains(&a));
        assert!(!set.contains(&b));
    }
}
