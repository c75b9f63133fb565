// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use crossbeam_channel::Receiver;
use ember_models::block::BlockId;
use ember_models::transaction::Transaction;
use ember_time::EmberTime;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::controller_traits::{
    ActionEvaluator, BlockCodec, ChainController, PolicyController, StagePolicy, Store,
};

/// Optional comparator ranking staged transactions for inclusion; within a
/// signer, nonce order always takes precedence over the comparator.
pub type TxPriority = Arc<dyn Fn(&Transaction, &Transaction) -> Ordering + Send + Sync>;

/// Event fired by the chain whenever a block is appended to the main branch
#[derive(Clone, Debug)]
pub struct TipChanged {
    /// tip before the append, `None` when the chain was empty
    pub old_tip: Option<BlockId>,
    /// tip after the append
    pub new_tip: BlockId,
}

/// Collaborators the proposal worker talks to
#[derive(Clone)]
pub struct ProposalChannels {
    /// local chain view and append handle
    pub chain: Box<dyn ChainController>,
    /// consensus policy
    pub policy: Box<dyn PolicyController>,
    /// persistent store
    pub store: Box<dyn Store>,
    /// staging pool
    pub stage: Box<dyn StagePolicy>,
    /// action evaluator
    pub evaluator: Box<dyn ActionEvaluator>,
    /// block codec, shared with the mining threads
    pub codec: Arc<dyn BlockCodec>,
}

/// Per-call options of a block proposal.
///
/// Every cap left to `None` defaults from the policy at the current block
/// count; the timestamp defaults to now; `cancel` defaults to never.
#[derive(Clone)]
pub struct ProposeOptions {
    /// block timestamp; defaults to the current UTC time
    pub timestamp: Option<EmberTime>,
    /// append the finalized block to the chain
    pub append: bool,
    /// override of the maximal encoded block size in bytes
    pub max_block_bytes: Option<u64>,
    /// override of the maximal transaction count
    pub max_transactions: Option<u32>,
    /// override of the maximal per-signer transaction count
    pub max_transactions_per_signer: Option<u32>,
    /// inclusion priority comparator
    pub tx_priority: Option<TxPriority>,
    /// caller-side cancellation: a message or a disconnection aborts mining
    pub cancel: Option<Receiver<()>>,
}

impl Default for ProposeOptions {
    fn default() -> Self {
        ProposeOptions {
            timestamp: None,
            append: true,
            max_block_bytes: None,
            max_transactions: None,
            max_transactions_per_signer: None,
            tx_priority: None,
            cancel: None,
        }
    }
}
