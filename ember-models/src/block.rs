// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! The block family: identifier, metadata, content, pre-evaluation and
//! finalized forms.

use crate::error::ModelsError;
use crate::transaction::Transaction;
use ember_hash::Hash;
use ember_signature::{PublicKey, Signature};
use ember_time::EmberTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const BLOCK_ID_PREFIX: char = 'B';

/// Hash identifying a finalized block
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BlockId(pub Hash);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", BLOCK_ID_PREFIX, self.0.to_bs58_check())
    }
}

impl std::fmt::Debug for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for BlockId {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == BLOCK_ID_PREFIX => Hash::from_bs58_check(chars.as_str())
                .map(BlockId)
                .map_err(|_| ModelsError::BlockIdParseError),
            _ => Err(ModelsError::BlockIdParseError),
        }
    }
}

impl ::serde::Serialize for BlockId {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_string())
        } else {
            self.0.serialize(s)
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for BlockId {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<BlockId, D::Error> {
        if d.is_human_readable() {
            let s = <String as ::serde::Deserialize>::deserialize(d)?;
            BlockId::from_str(&s).map_err(::serde::de::Error::custom)
        } else {
            Hash::deserialize(d).map(BlockId)
        }
    }
}

/// Header data of a candidate block, assembled before mining.
///
/// Ephemeral: discarded if the proof-of-work search aborts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// height of the block, 0 for genesis
    pub index: u64,
    /// proof-of-work difficulty, strictly positive
    pub difficulty: u64,
    /// cumulative difficulty from genesis through this block
    pub total_difficulty: u128,
    /// public key of the proposer; absent in legacy genesis blocks
    pub public_key: Option<PublicKey>,
    /// hash of the predecessor; absent iff `index == 0`
    pub previous_hash: Option<BlockId>,
    /// wall-clock creation time, UTC
    pub timestamp: EmberTime,
}

/// Metadata plus the ordered transaction list; the order is fixed for hashing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContent {
    /// header data
    pub metadata: BlockMetadata,
    /// transactions in gather output order
    pub transactions: Vec<Transaction>,
}

/// A block whose header is finalized through proof-of-work but whose
/// post-execution state root is not yet set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreEvaluationBlock {
    /// header and transactions
    pub content: BlockContent,
    /// winning proof-of-work nonce
    pub nonce: u64,
    /// hash over metadata, transactions and nonce, satisfying the difficulty
    pub pre_evaluation_hash: Hash,
}

/// A fully evaluated, immutable block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// header and transactions
    pub content: BlockContent,
    /// winning proof-of-work nonce
    pub nonce: u64,
    /// hash over metadata, transactions and nonce
    pub pre_evaluation_hash: Hash,
    /// root hash of the state after executing all actions
    pub state_root_hash: Hash,
    /// proposer signature; absent in legacy genesis blocks
    pub signature: Option<Signature>,
    /// final block hash
    pub id: BlockId,
}

impl Block {
    /// Height of the block.
    pub fn index(&self) -> u64 {
        self.content.metadata.index
    }

    /// Transactions in inclusion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.content.transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_text_round_trip() {
        let id = BlockId(Hash::compute_from(b"block"));
        let text = id.to_string();
        assert!(text.starts_with(BLOCK_ID_PREFIX));
        assert_eq!(BlockId::from_str(&text).unwrap(), id);
    }

    #[test]
    fn block_id_rejects_wrong_prefix() {
        let id = BlockId(Hash::compute_from(b"block"));
        let mangled = format!("X{}", &id.to_string()[1..]);
        assert!(BlockId::from_str(&mangled).is_err());
    }
}
