// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use ember_models::block::BlockMetadata;
use ember_proposal_exports::{
    ChainController, PolicyController, ProposalResult, Store, StoreError,
};
use ember_signature::PublicKey;
use ember_time::EmberTime;

/// Builds the metadata of the next block from the current chain view.
///
/// Pure given the collaborator reads: no side effects, discarded if mining
/// aborts.
pub(crate) fn build_next_metadata(
    chain: &dyn ChainController,
    policy: &dyn PolicyController,
    store: &dyn Store,
    public_key: PublicKey,
    timestamp: EmberTime,
) -> ProposalResult<BlockMetadata> {
    let index = chain.block_count();
    let difficulty = policy.next_block_difficulty(chain);
    let previous_hash = if index > 0 {
        let id = store
            .index_block_hash(chain.chain_id(), index - 1)?
            .ok_or(StoreError::MissingBlockHash(index - 1))?;
        Some(id)
    } else {
        None
    };
    let total_difficulty = chain
        .tip()
        .map(|tip| tip.total_difficulty)
        .unwrap_or(0)
        + difficulty as u128;
    Ok(BlockMetadata {
        index,
        difficulty,
        total_difficulty,
        public_key: Some(public_key),
        previous_hash,
        timestamp,
    })
}
