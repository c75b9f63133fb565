// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use crate::gather::{GatherLimits, TransactionGatherer};
use crate::metadata::build_next_metadata;
use crate::mining;
use ember_models::block::{Block, BlockContent};
use ember_models::execution::{ActionEvaluation, TxExecution};
use ember_models::maps::DigestSet;
use ember_models::transaction::TransactionId;
use ember_proposal_exports::{
    ProposalChannels, ProposalConfig, ProposalError, ProposalResult, ProposeOptions,
};
use ember_signature::KeyPair;
use ember_time::EmberTime;
use tracing::{debug, info};

/// Orchestrates one block proposal end to end: metadata assembly, transaction
/// gathering, proof-of-work mining, action evaluation, execution persistence
/// and the optional chain append.
///
/// A proposer assumes it is the only one proposing on its chain at any given
/// time; concurrent `propose` calls on the same chain are not supported and
/// are serialized by the worker thread in this crate.
pub struct BlockProposer {
    config: ProposalConfig,
    channels: ProposalChannels,
}

impl BlockProposer {
    /// Creates a proposer over the given collaborators.
    pub fn new(config: ProposalConfig, channels: ProposalChannels) -> Self {
        BlockProposer { config, channels }
    }

    /// Proposes one block.
    ///
    /// Fails with `InsufficientTransactions` when the gathering pass yields
    /// fewer transactions than the policy minimum, and with `Cancelled` when
    /// the chain tip moves during mining or the caller's cancel signal fires.
    /// On any failure no block is appended and the staged transactions stay
    /// staged, except those evicted by policy validation.
    pub fn propose(
        &self,
        proposer_key: &KeyPair,
        options: ProposeOptions,
    ) -> ProposalResult<Block> {
        let chain = self.channels.chain.as_ref();
        let policy = self.channels.policy.as_ref();
        let store = self.channels.store.as_ref();
        let index = chain.block_count();

        let timestamp = match options.timestamp {
            Some(timestamp) => timestamp,
            None => EmberTime::now()?,
        };
        let limits = GatherLimits {
            max_block_bytes: options
                .max_block_bytes
                .unwrap_or_else(|| policy.max_block_bytes(index)),
            max_transactions: options
                .max_transactions
                .unwrap_or_else(|| policy.max_transactions_per_block(index)),
            max_transactions_per_signer: options
                .max_transactions_per_signer
                .unwrap_or_else(|| policy.max_transactions_per_signer_per_block(index)),
        };

        let metadata =
            build_next_metadata(chain, policy, store, proposer_key.get_public_key(), timestamp)?;

        let gatherer = TransactionGatherer {
            chain,
            policy,
            store,
            stage: self.channels.stage.as_ref(),
            codec: self.channels.codec.as_ref(),
            budget: self.config.gather_budget.to_duration(),
        };
        let transactions = gatherer.gather(&metadata, &limits, options.tx_priority.as_ref())?;

        let min = policy.min_transactions_per_block(index) as usize;
        if transactions.len() < min {
            return Err(ProposalError::InsufficientTransactions {
                got: transactions.len(),
                min,
            });
        }
        debug!(
            "gathered {} transactions for the block at index {}",
            transactions.len(),
            index
        );

        let content = BlockContent {
            metadata,
            transactions,
        };
        // subscribe before the search starts so an append racing with it is
        // observed; `mine` consumes the receiver, releasing the subscription
        // on every exit path
        let tip_changes = chain.subscribe_tip_changes();
        let pre_evaluation = mining::mine(
            self.channels.codec.as_ref(),
            content,
            self.config.mining_threads,
            self.config.cancel_check_interval,
            tip_changes,
            options.cancel,
        )?;

        let (block, evaluations) = self
            .channels
            .evaluator
            .evaluate(pre_evaluation, proposer_key, chain)?;
        let executions = derive_executions(&block, &evaluations);
        store.update_tx_executions(&executions)?;

        if options.append {
            chain.append(block.clone(), evaluations)?;
        }
        info!(
            "proposed block {} at index {} with {} transactions ({})",
            block.id,
            block.index(),
            block.transactions().len(),
            timestamp.to_utc_string()
        );
        Ok(block)
    }
}

/// A transaction succeeded iff none of its action evaluations raised.
fn derive_executions(block: &Block, evaluations: &[ActionEvaluation]) -> Vec<TxExecution> {
    let failed: DigestSet<TransactionId> = evaluations
        .iter()
        .filter_map(|evaluation| {
            evaluation
                .exception
                .is_some()
                .then_some(evaluation.transaction)
                .flatten()
        })
        .collect();
    block
        .transactions()
        .iter()
        .map(|tx| TxExecution {
            block: block.id,
            transaction: tx.id,
            success: !failed.contains(&tx.id),
        })
        .collect()
}
