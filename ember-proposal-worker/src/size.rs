// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use ember_models::block::BlockMetadata;
use ember_models::transaction::Transaction;
use ember_proposal_exports::BlockCodec;

/// Incremental lower bound on the encoded size of a block under assembly.
///
/// The header is accounted for with its worst-case placeholder shape (real
/// metadata, placeholder signature, zeroed digests); transactions are
/// accounted for as they are appended. For any transaction sequence the
/// running length equals what the codec would produce for a block with those
/// transactions and a placeholder header.
pub(crate) struct BlockSizeEstimator<'a> {
    codec: &'a dyn BlockCodec,
    /// placeholder-header length, without the transaction list framing
    base: u64,
    tx_bytes: u64,
    tx_count: u64,
}

impl<'a> BlockSizeEstimator<'a> {
    pub(crate) fn new(codec: &'a dyn BlockCodec, metadata: &BlockMetadata) -> Self {
        let base = codec.empty_block_encoded_len(metadata) - codec.sequence_overhead(0);
        BlockSizeEstimator {
            codec,
            base,
            tx_bytes: 0,
            tx_count: 0,
        }
    }

    /// Current encoded length.
    pub(crate) fn len(&self) -> u64 {
        self.base + self.tx_bytes + self.codec.sequence_overhead(self.tx_count)
    }

    /// Encoded length the block would have with `tx` appended.
    pub(crate) fn appended_len(&self, tx: &Transaction) -> u64 {
        self.base
            + self.tx_bytes
            + self.codec.transaction_encoded_len(tx)
            + self.codec.sequence_overhead(self.tx_count + 1)
    }

    /// Commit `tx` to the running estimate.
    pub(crate) fn push(&mut self, tx: &Transaction) {
        self.tx_bytes += self.codec.transaction_encoded_len(tx);
        self.tx_count += 1;
    }
}
