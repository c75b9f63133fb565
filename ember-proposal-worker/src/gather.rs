// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use crate::size::BlockSizeEstimator;
use ember_models::address::Address;
use ember_models::block::BlockMetadata;
use ember_models::chain::ChainId;
use ember_models::maps::DigestMap;
use ember_models::transaction::Transaction;
use ember_proposal_exports::{
    BlockCodec, ChainController, PolicyController, ProposalResult, StagePolicy, Store, TxPriority,
};
use std::collections::hash_map::Entry;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Caps one gathering pass must respect
pub(crate) struct GatherLimits {
    /// maximal encoded block size in bytes
    pub max_block_bytes: u64,
    /// maximal transaction count
    pub max_transactions: u32,
    /// maximal transaction count per signer
    pub max_transactions_per_signer: u32,
}

/// Per-signer admission state, alive for one gathering pass
struct SignerState {
    /// next nonce the chain expected at pass start
    stored_nonce: u64,
    /// next admissible nonce, advanced on every admission
    next_nonce: u64,
    /// transactions admitted for this signer in this pass
    to_mine_count: u32,
}

/// Selects a policy-compliant, nonce-contiguous subset of the staged
/// transactions under the given caps and a soft wall-clock budget.
pub(crate) struct TransactionGatherer<'a> {
    pub chain: &'a dyn ChainController,
    pub policy: &'a dyn PolicyController,
    pub store: &'a dyn Store,
    pub stage: &'a dyn StagePolicy,
    pub codec: &'a dyn BlockCodec,
    pub budget: Duration,
}

impl<'a> TransactionGatherer<'a> {
    /// Runs one gathering pass over a snapshot of the staging pool.
    ///
    /// Returns normally even when empty; minimum-count enforcement belongs
    /// to the proposer.
    pub(crate) fn gather(
        &self,
        metadata: &BlockMetadata,
        limits: &GatherLimits,
        priority: Option<&TxPriority>,
    ) -> ProposalResult<Vec<Transaction>> {
        let chain_id = self.chain.chain_id();
        let staged = self.stage.list_staged(chain_id, priority);
        let deadline = Instant::now() + self.budget;
        let mut estimator = BlockSizeEstimator::new(self.codec, metadata);
        let mut signers: DigestMap<Address, SignerState> = Default::default();
        let mut gathered = Vec::new();

        for tx in staged {
            if gathered.len() >= limits.max_transactions as usize {
                break;
            }
            self.consider(
                tx,
                chain_id,
                limits,
                &mut signers,
                &mut estimator,
                &mut gathered,
            )?;
            // the budget is checked after each processed transaction, so at
            // least one staged transaction always gets considered
            if Instant::now() > deadline {
                debug!(
                    "collection budget exhausted after {} gathered transactions",
                    gathered.len()
                );
                break;
            }
        }
        Ok(gathered)
    }

    /// One admission decision. Per-transaction issues recover locally: a
    /// stale, gapped or duplicate nonce is skipped, a policy violation gets
    /// the transaction evicted from the pool.
    fn consider(
        &self,
        tx: Transaction,
        chain_id: ChainId,
        limits: &GatherLimits,
        signers: &mut DigestMap<Address, SignerState>,
        estimator: &mut BlockSizeEstimator,
        gathered: &mut Vec<Transaction>,
    ) -> ProposalResult<()> {
        let state = match signers.entry(tx.signer) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let stored_nonce = self.store.get_tx_nonce(chain_id, &tx.signer)?;
                entry.insert(SignerState {
                    stored_nonce,
                    next_nonce: stored_nonce,
                    to_mine_count: 0,
                })
            }
        };

        if tx.nonce != state.next_nonce {
            if tx.nonce < state.stored_nonce {
                trace!(
                    "skipping staged transaction {}: stale nonce {} (stored nonce {})",
                    tx.id,
                    tx.nonce,
                    state.stored_nonce
                );
            } else if tx.nonce > state.next_nonce {
                trace!(
                    "skipping staged transaction {}: nonce gap {} (next nonce {})",
                    tx.id,
                    tx.nonce,
                    state.next_nonce
                );
            } else {
                // same (signer, nonce) as an already gathered transaction:
                // the snapshot order decided, the loser stays in the pool
                trace!(
                    "skipping staged transaction {}: nonce {} already gathered",
                    tx.id,
                    tx.nonce
                );
            }
            return Ok(());
        }

        if let Err(violation) = self.policy.validate_next_block_tx(self.chain, &tx) {
            debug!("evicting staged transaction {}: {}", tx.id, violation);
            self.stage.ignore(chain_id, &tx.id);
            return Ok(());
        }

        // skip, don't break: a later, smaller transaction from another
        // signer may still fit
        if estimator.appended_len(&tx) > limits.max_block_bytes {
            trace!(
                "skipping staged transaction {}: it would push the block over {} bytes",
                tx.id,
                limits.max_block_bytes
            );
            return Ok(());
        }

        if state.to_mine_count >= limits.max_transactions_per_signer {
            trace!(
                "skipping staged transaction {}: signer {} reached the per-signer cap",
                tx.id,
                tx.signer
            );
            return Ok(());
        }

        state.next_nonce += 1;
        state.to_mine_count += 1;
        estimator.push(&tx);
        gathered.push(tx);
        Ok(())
    }
}
