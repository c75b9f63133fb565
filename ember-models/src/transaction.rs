// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! Signed transactions and their identifiers.

use crate::address::Address;
use crate::error::ModelsError;
use ember_hash::Hash;
use ember_signature::Signature;
use ember_time::EmberTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const TRANSACTION_ID_PREFIX: char = 'T';

/// Content hash identifying a transaction
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TransactionId(pub Hash);

impl TransactionId {
    /// Wrap a content hash as a transaction id.
    pub fn new(hash: Hash) -> Self {
        TransactionId(hash)
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", TRANSACTION_ID_PREFIX, self.0.to_bs58_check())
    }
}

impl std::fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for TransactionId {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == TRANSACTION_ID_PREFIX => {
                Hash::from_bs58_check(chars.as_str())
                    .map(TransactionId)
                    .map_err(|_| ModelsError::TransactionIdParseError)
            }
            _ => Err(ModelsError::TransactionIdParseError),
        }
    }
}

impl ::serde::Serialize for TransactionId {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_string())
        } else {
            self.0.serialize(s)
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for TransactionId {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<TransactionId, D::Error> {
        if d.is_human_readable() {
            let s = <String as ::serde::Deserialize>::deserialize(d)?;
            TransactionId::from_str(&s).map_err(::serde::de::Error::custom)
        } else {
            Hash::deserialize(d).map(TransactionId)
        }
    }
}

/// A signed transaction staged for inclusion in a block.
///
/// The payload is opaque to the proposal core; its interpretation belongs to
/// the action evaluator. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// content hash
    pub id: TransactionId,
    /// address of the signing account
    pub signer: Address,
    /// per-signer sequence number, starts at 0
    pub nonce: u64,
    /// creation time
    pub timestamp: EmberTime,
    /// opaque action bytes
    pub payload: Vec<u8>,
    /// signature by the signer over the content hash
    pub signature: Signature,
    /// full encoded size in bytes, stamped by the codec that admitted it
    pub serialized_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_signature::KeyPair;

    #[test]
    fn transaction_id_text_round_trip() {
        let id = TransactionId(Hash::compute_from(b"tx"));
        let text = id.to_string();
        assert!(text.starts_with(TRANSACTION_ID_PREFIX));
        assert_eq!(TransactionId::from_str(&text).unwrap(), id);
    }

    #[test]
    fn transaction_serde_round_trip() {
        let keypair = KeyPair::from_bytes(&[2u8; 32]);
        let id = TransactionId(Hash::compute_from(b"payload"));
        let tx = Transaction {
            id,
            signer: Address::from_public_key(&keypair.get_public_key()),
            nonce: 4,
            timestamp: EmberTime::from_millis(1_234),
            payload: b"payload".to_vec(),
            signature: keypair.sign(&id.0).unwrap(),
            serialized_size: 151,
        };
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }
}
