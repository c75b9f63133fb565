// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! This module exports generic traits representing interfaces for interacting
//! with the proposal worker and with the collaborators it consumes.

use crossbeam_channel::Receiver;
use ember_hash::Hash;
use ember_models::address::Address;
use ember_models::block::{Block, BlockContent, BlockId, BlockMetadata, PreEvaluationBlock};
use ember_models::chain::{ChainId, TipInfo};
use ember_models::execution::{ActionEvaluation, TxExecution};
use ember_models::transaction::{Transaction, TransactionId};
use ember_signature::KeyPair;

use crate::error::{ChainError, EvaluationError, PolicyViolation, StoreError};
use crate::types::{ProposeOptions, TipChanged, TxPriority};
use crate::ProposalResult;

/// Interface to the local view of the chain: tip, counters, event
/// subscription and atomic append.
pub trait ChainController: Send + Sync {
    /// Identifier of the chain, fixed at genesis.
    fn chain_id(&self) -> ChainId;

    /// Number of blocks on the main branch; the next block gets this index.
    fn block_count(&self) -> u64;

    /// Summary of the last block on the main branch, `None` on an empty chain.
    fn tip(&self) -> Option<TipInfo>;

    /// Subscribe to tip-change events.
    ///
    /// Every `append` (local or observed) is delivered to all live
    /// subscribers. Dropping the receiver unsubscribes; late deliveries to a
    /// dropped receiver are discarded on the chain side.
    fn subscribe_tip_changes(&self) -> Receiver<TipChanged>;

    /// Atomically append a finalized block to the main branch.
    ///
    /// The evaluations produced when the block was proposed are handed over
    /// so the chain does not re-execute the actions.
    fn append(&self, block: Block, evaluations: Vec<ActionEvaluation>) -> Result<(), ChainError>;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn ChainController>`.
    fn clone_box(&self) -> Box<dyn ChainController>;
}

/// Allow cloning `Box<dyn ChainController>`
/// Uses `ChainController::clone_box` internally
impl Clone for Box<dyn ChainController> {
    fn clone(&self) -> Box<dyn ChainController> {
        self.clone_box()
    }
}

/// Consensus policy consulted while assembling a candidate block
pub trait PolicyController: Send + Sync {
    /// Maximal encoded block size in bytes at the given index.
    fn max_block_bytes(&self, index: u64) -> u64;

    /// Maximal number of transactions in a block at the given index.
    fn max_transactions_per_block(&self, index: u64) -> u32;

    /// Maximal number of transactions from one signer in a block at the given index.
    fn max_transactions_per_signer_per_block(&self, index: u64) -> u32;

    /// Minimal number of transactions required in a block at the given index.
    fn min_transactions_per_block(&self, index: u64) -> u32;

    /// Proof-of-work difficulty of the next block given the current chain.
    fn next_block_difficulty(&self, chain: &dyn ChainController) -> u64;

    /// Validate a staged transaction against the chain for inclusion in the
    /// next block; a violation gets the transaction evicted from the pool.
    fn validate_next_block_tx(
        &self,
        chain: &dyn ChainController,
        tx: &Transaction,
    ) -> Result<(), PolicyViolation>;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn PolicyController>`.
    fn clone_box(&self) -> Box<dyn PolicyController>;
}

/// Allow cloning `Box<dyn PolicyController>`
/// Uses `PolicyController::clone_box` internally
impl Clone for Box<dyn PolicyController> {
    fn clone(&self) -> Box<dyn PolicyController> {
        self.clone_box()
    }
}

/// Persistent store consulted and written by the proposal worker
pub trait Store: Send + Sync {
    /// Hash of the block indexed at the given height, if any.
    fn index_block_hash(&self, chain_id: ChainId, index: u64) -> Result<Option<BlockId>, StoreError>;

    /// Next nonce the chain expects from the signer: 1 + the highest nonce
    /// already included for it, 0 if none.
    fn get_tx_nonce(&self, chain_id: ChainId, signer: &Address) -> Result<u64, StoreError>;

    /// Persist per-transaction execution records.
    fn update_tx_executions(&self, executions: &[TxExecution]) -> Result<(), StoreError>;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn Store>`.
    fn clone_box(&self) -> Box<dyn Store>;
}

/// Allow cloning `Box<dyn Store>`
/// Uses `Store::clone_box` internally
impl Clone for Box<dyn Store> {
    fn clone(&self) -> Box<dyn Store> {
        self.clone_box()
    }
}

/// Staging pool of transactions waiting for inclusion
pub trait StagePolicy: Send + Sync {
    /// Ordered snapshot of the staged transactions: sorted by the priority
    /// comparator when given (ties broken by `(signer, nonce)` ascending),
    /// by `(signer, nonce)` ascending otherwise.
    fn list_staged(&self, chain_id: ChainId, priority: Option<&TxPriority>) -> Vec<Transaction>;

    /// Permanently evict a transaction from the pool.
    fn ignore(&self, chain_id: ChainId, id: &TransactionId);

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn StagePolicy>`.
    fn clone_box(&self) -> Box<dyn StagePolicy>;
}

/// Allow cloning `Box<dyn StagePolicy>`
/// Uses `StagePolicy::clone_box` internally
impl Clone for Box<dyn StagePolicy> {
    fn clone(&self) -> Box<dyn StagePolicy> {
        self.clone_box()
    }
}

/// Deterministic executor of block actions, producing the finalized block
pub trait ActionEvaluator: Send + Sync {
    /// Execute all actions of a mined block against current state, producing
    /// the finalized block (state root, signature, hash) and the evaluation
    /// of every action. The chain handle gives the evaluator access to the
    /// state it executes against.
    fn evaluate(
        &self,
        block: PreEvaluationBlock,
        proposer_key: &KeyPair,
        chain: &dyn ChainController,
    ) -> Result<(Block, Vec<ActionEvaluation>), EvaluationError>;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn ActionEvaluator>`.
    fn clone_box(&self) -> Box<dyn ActionEvaluator>;
}

/// Allow cloning `Box<dyn ActionEvaluator>`
/// Uses `ActionEvaluator::clone_box` internally
impl Clone for Box<dyn ActionEvaluator> {
    fn clone(&self) -> Box<dyn ActionEvaluator> {
        self.clone_box()
    }
}

/// Marshalling and hashing primitives for blocks and transactions.
///
/// The byte format is owned by the codec; the proposal core only ever asks
/// for lengths and digests, never decodes bytes itself.
pub trait BlockCodec: Send + Sync {
    /// Width of the codec's digests, in bytes.
    fn digest_size(&self) -> usize;

    /// Length of the worst-case signature placeholder used when bounding the
    /// encoded size of an unsigned block (e.g. 71 for DER-encoded ECDSA, the
    /// exact signature width for fixed-size schemes).
    fn signature_placeholder_len(&self) -> u64;

    /// Encoded length of a block carrying the given metadata, no
    /// transactions, and a placeholder header: real metadata, placeholder
    /// signature when a public key is present, zeroed digest-size nonce,
    /// hashes and state root.
    fn empty_block_encoded_len(&self, metadata: &BlockMetadata) -> u64;

    /// Encoded length of one transaction inside a block's transaction list.
    fn transaction_encoded_len(&self, tx: &Transaction) -> u64;

    /// Framing overhead of a transaction list with the given element count.
    fn sequence_overhead(&self, count: u64) -> u64;

    /// Hash over metadata, transactions and nonce, the value the
    /// proof-of-work search drives under the difficulty target.
    fn pre_evaluation_hash(&self, content: &BlockContent, nonce: u64) -> Hash;

    /// Whether a digest satisfies the given difficulty, per the codec's
    /// target convention.
    fn meets_difficulty(&self, hash: &Hash, difficulty: u64) -> bool;

    /// Full encoding of a finalized block.
    fn serialize_block(&self, block: &Block) -> Vec<u8>;
}

/// Interface that communicates with the proposal worker thread
pub trait ProposalController: Send + Sync {
    /// Propose one block with the given options; blocks until the proposal
    /// completes, fails, or is cancelled.
    fn propose(&self, options: ProposeOptions) -> ProposalResult<Block>;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn ProposalController>`.
    fn clone_box(&self) -> Box<dyn ProposalController>;
}

/// Allow cloning `Box<dyn ProposalController>`
/// Uses `ProposalController::clone_box` internally
impl Clone for Box<dyn ProposalController> {
    fn clone(&self) -> Box<dyn ProposalController> {
        self.clone_box()
    }
}

/// Proposal manager used to stop the proposal worker thread
pub trait ProposalManager {
    /// Stop the proposal worker thread.
    fn stop(&mut self);
}
