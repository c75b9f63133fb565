// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use ember_hash::{Hash, HASH_SIZE_BYTES};
use ember_models::block::{Block, BlockContent, BlockId, BlockMetadata};
use ember_models::transaction::Transaction;
use ember_signature::{Signature, SIGNATURE_SIZE_BYTES};

use crate::controller_traits::BlockCodec;

/// Deterministic fixed-layout codec used by the test suites.
///
/// Scalars are big-endian fixed-width, optional fields carry a one-byte
/// presence flag, sequences carry an LEB128 length prefix. The difficulty
/// convention interprets the first 8 digest bytes as a big-endian integer
/// that must not exceed `u64::MAX / difficulty`.
#[derive(Clone, Debug, Default)]
pub struct TestCodec;

fn varint_len(mut value: u64) -> u64 {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

fn put_varint(buffer: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buffer.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buffer.push(value as u8);
}

fn put_optional(buffer: &mut Vec<u8>, bytes: Option<&[u8]>) {
    match bytes {
        Some(bytes) => {
            buffer.push(1);
            buffer.extend_from_slice(bytes);
        }
        None => buffer.push(0),
    }
}

impl TestCodec {
    fn serialize_metadata(&self, metadata: &BlockMetadata, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&metadata.index.to_be_bytes());
        buffer.extend_from_slice(&metadata.difficulty.to_be_bytes());
        buffer.extend_from_slice(&metadata.total_difficulty.to_be_bytes());
        buffer.extend_from_slice(&metadata.timestamp.to_millis().to_be_bytes());
        put_optional(
            buffer,
            metadata.previous_hash.as_ref().map(|id| id.0.to_bytes().as_slice()),
        );
        let public_key = metadata.public_key.map(|key| key.to_bytes());
        put_optional(buffer, public_key.as_ref().map(|bytes| bytes.as_slice()));
    }

    fn serialize_transaction(&self, tx: &Transaction, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(tx.id.0.to_bytes());
        buffer.extend_from_slice(tx.signer.to_bytes());
        buffer.extend_from_slice(&tx.nonce.to_be_bytes());
        buffer.extend_from_slice(&tx.timestamp.to_millis().to_be_bytes());
        put_varint(buffer, tx.payload.len() as u64);
        buffer.extend_from_slice(&tx.payload);
        buffer.extend_from_slice(&tx.signature.to_bytes());
    }

    /// The placeholder-header block used for size estimation: real metadata,
    /// zeroed digests and nonce, placeholder signature when a public key is
    /// present.
    pub fn placeholder_block(&self, metadata: &BlockMetadata, transactions: Vec<Transaction>) -> Block {
        let zero = Hash::from_bytes(&[0u8; HASH_SIZE_BYTES]);
        Block {
            signature: metadata
                .public_key
                .map(|_| Signature::from_bytes(&[0u8; SIGNATURE_SIZE_BYTES])),
            content: BlockContent {
                metadata: metadata.clone(),
                transactions,
            },
            nonce: 0,
            pre_evaluation_hash: zero,
            state_root_hash: zero,
            id: BlockId(zero),
        }
    }
}

impl BlockCodec for TestCodec {
    fn digest_size(&self) -> usize {
        HASH_SIZE_BYTES
    }

    fn signature_placeholder_len(&self) -> u64 {
        SIGNATURE_SIZE_BYTES as u64
    }

    fn empty_block_encoded_len(&self, metadata: &BlockMetadata) -> u64 {
        self.serialize_block(&self.placeholder_block(metadata, Vec::new()))
            .len() as u64
    }

    fn transaction_encoded_len(&self, tx: &Transaction) -> u64 {
        let mut buffer = Vec::new();
        self.serialize_transaction(tx, &mut buffer);
        buffer.len() as u64
    }

    fn sequence_overhead(&self, count: u64) -> u64 {
        varint_len(count)
    }

    fn pre_evaluation_hash(&self, content: &BlockContent, nonce: u64) -> Hash {
        let mut buffer = Vec::new();
        self.serialize_metadata(&content.metadata, &mut buffer);
        for tx in &content.transactions {
            buffer.extend_from_slice(tx.id.0.to_bytes());
        }
        buffer.extend_from_slice(&nonce.to_be_bytes());
        Hash::compute_from(&buffer)
    }

    fn meets_difficulty(&self, hash: &Hash, difficulty: u64) -> bool {
        let head: [u8; 8] = hash.to_bytes()[..8].try_into().unwrap();
        u64::from_be_bytes(head) <= u64::MAX / difficulty.max(1)
    }

    fn serialize_block(&self, block: &Block) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.serialize_metadata(&block.content.metadata, &mut buffer);
        buffer.extend_from_slice(&block.nonce.to_be_bytes());
        buffer.extend_from_slice(block.pre_evaluation_hash.to_bytes());
        buffer.extend_from_slice(block.state_root_hash.to_bytes());
        buffer.extend_from_slice(block.id.0.to_bytes());
        let signature = block.signature.map(|signature| signature.to_bytes());
        put_optional(&mut buffer, signature.as_ref().map(|bytes| bytes.as_slice()));
        put_varint(&mut buffer, block.content.transactions.len() as u64);
        for tx in &block.content.transactions {
            self.serialize_transaction(tx, &mut buffer);
        }
        buffer
    }
}
