// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! In-memory mock collaborators.
//!
//! Every mock wraps its state in `Arc<Mutex<..>>` so that clones handed to
//! the worker observe the same state as the copy kept by the test, and so the
//! chain mock can fire `TipChanged` events from any thread.

use crossbeam_channel::{unbounded, Receiver, Sender};
use ember_hash::Hash;
use ember_models::address::Address;
use ember_models::block::{Block, BlockId, PreEvaluationBlock};
use ember_models::chain::{ChainId, TipInfo};
use ember_models::execution::{ActionEvaluation, TxExecution};
use ember_models::maps::{DigestMap, DigestSet};
use ember_models::transaction::{Transaction, TransactionId};
use ember_signature::KeyPair;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::controller_traits::{
    ActionEvaluator, ChainController, PolicyController, StagePolicy, Store,
};
use crate::error::{ChainError, EvaluationError, PolicyViolation, StoreError};
use crate::types::{TipChanged, TxPriority};

struct ChainState {
    chain_id: ChainId,
    count: u64,
    tip: Option<TipInfo>,
    appended: Vec<Block>,
    subscribers: Vec<Sender<TipChanged>>,
}

impl ChainState {
    fn notify(&mut self, old_tip: Option<BlockId>, new_tip: BlockId) {
        self.subscribers.retain(|subscriber| {
            subscriber
                .send(TipChanged {
                    old_tip,
                    new_tip,
                })
                .is_ok()
        });
    }
}

/// In-memory chain: a tip summary, an append log and live tip subscribers
#[derive(Clone)]
pub struct MockChainController(Arc<Mutex<ChainState>>);

impl MockChainController {
    /// Create an empty chain with the given id.
    pub fn new(chain_id: ChainId) -> Self {
        MockChainController(Arc::new(Mutex::new(ChainState {
            chain_id,
            count: 0,
            tip: None,
            appended: Vec::new(),
            subscribers: Vec::new(),
        })))
    }

    /// Install a tip without going through `append`, e.g. a genesis block.
    pub fn seed_tip(&self, tip: TipInfo) {
        let mut state = self.0.lock();
        state.count = tip.index + 1;
        state.tip = Some(tip);
    }

    /// Blocks appended through `ChainController::append`, oldest first.
    pub fn appended(&self) -> Vec<Block> {
        self.0.lock().appended.clone()
    }

    /// Simulate a block appended by another node: advances the tip and fires
    /// `TipChanged` without touching the append log.
    pub fn external_append(&self, difficulty: u64) {
        let mut state = self.0.lock();
        let index = state.count;
        let id = BlockId(Hash::compute_from(format!("external-{}", index).as_bytes()));
        let old_tip = state.tip.as_ref().map(|tip| tip.id);
        let total_difficulty = state
            .tip
            .as_ref()
            .map(|tip| tip.total_difficulty)
            .unwrap_or(0)
            + difficulty as u128;
        state.tip = Some(TipInfo {
            id,
            index,
            total_difficulty,
        });
        state.count = index + 1;
        state.notify(old_tip, id);
    }
}

impl ChainController for MockChainController {
    fn chain_id(&self) -> ChainId {
        self.0.lock().chain_id
    }

    fn block_count(&self) -> u64 {
        self.0.lock().count
    }

    fn tip(&self) -> Option<TipInfo> {
        self.0.lock().tip
    }

    fn subscribe_tip_changes(&self) -> Receiver<TipChanged> {
        let (tx, rx) = unbounded();
        self.0.lock().subscribers.push(tx);
        rx
    }

    fn append(&self, block: Block, _evaluations: Vec<ActionEvaluation>) -> Result<(), ChainError> {
        let mut state = self.0.lock();
        let old_tip = state.tip.as_ref().map(|tip| tip.id);
        let metadata = &block.content.metadata;
        state.tip = Some(TipInfo {
            id: block.id,
            index: metadata.index,
            total_difficulty: metadata.total_difficulty,
        });
        state.count = metadata.index + 1;
        let new_tip = block.id;
        state.appended.push(block);
        state.notify(old_tip, new_tip);
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn ChainController> {
        Box::new(self.clone())
    }
}

/// Policy mock with constant caps and an explicit rejection set
#[derive(Clone)]
pub struct MockPolicyController {
    /// maximal encoded block size
    pub max_block_bytes: u64,
    /// maximal transaction count per block
    pub max_transactions: u32,
    /// maximal per-signer transaction count per block
    pub max_transactions_per_signer: u32,
    /// minimal transaction count per block
    pub min_transactions: u32,
    /// constant difficulty of every next block
    pub difficulty: u64,
    rejected: Arc<Mutex<DigestSet<TransactionId>>>,
}

impl Default for MockPolicyController {
    fn default() -> Self {
        MockPolicyController {
            max_block_bytes: 1_000_000_000,
            max_transactions: 1_024,
            max_transactions_per_signer: 1_024,
            min_transactions: 0,
            difficulty: 1,
            rejected: Default::default(),
        }
    }
}

impl MockPolicyController {
    /// Make `validate_next_block_tx` reject the given transaction.
    pub fn reject(&self, id: TransactionId) {
        self.rejected.lock().insert(id);
    }
}

impl PolicyController for MockPolicyController {
    fn max_block_bytes(&self, _index: u64) -> u64 {
        self.max_block_bytes
    }

    fn max_transactions_per_block(&self, _index: u64) -> u32 {
        self.max_transactions
    }

    fn max_transactions_per_signer_per_block(&self, _index: u64) -> u32 {
        self.max_transactions_per_signer
    }

    fn min_transactions_per_block(&self, _index: u64) -> u32 {
        self.min_transactions
    }

    fn next_block_difficulty(&self, _chain: &dyn ChainController) -> u64 {
        self.difficulty
    }

    fn validate_next_block_tx(
        &self,
        _chain: &dyn ChainController,
        tx: &Transaction,
    ) -> Result<(), PolicyViolation> {
        if self.rejected.lock().contains(&tx.id) {
            return Err(PolicyViolation {
                reason: format!("transaction {} rejected by test policy", tx.id),
            });
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn PolicyController> {
        Box::new(self.clone())
    }
}

/// Store mock over plain in-memory maps
#[derive(Clone, Default)]
pub struct MockStore {
    nonces: Arc<Mutex<DigestMap<Address, u64>>>,
    block_hashes: Arc<Mutex<HashMap<u64, BlockId>>>,
    executions: Arc<Mutex<Vec<TxExecution>>>,
}

impl MockStore {
    /// Set the next expected nonce of a signer.
    pub fn set_nonce(&self, signer: Address, nonce: u64) {
        self.nonces.lock().insert(signer, nonce);
    }

    /// Index a block hash at a height.
    pub fn set_block_hash(&self, index: u64, id: BlockId) {
        self.block_hashes.lock().insert(index, id);
    }

    /// Execution records persisted so far.
    pub fn executions(&self) -> Vec<TxExecution> {
        self.executions.lock().clone()
    }
}

impl Store for MockStore {
    fn index_block_hash(
        &self,
        _chain_id: ChainId,
        index: u64,
    ) -> Result<Option<BlockId>, StoreError> {
        Ok(self.block_hashes.lock().get(&index).copied())
    }

    fn get_tx_nonce(&self, _chain_id: ChainId, signer: &Address) -> Result<u64, StoreError> {
        Ok(self.nonces.lock().get(signer).copied().unwrap_or(0))
    }

    fn update_tx_executions(&self, executions: &[TxExecution]) -> Result<(), StoreError> {
        self.executions.lock().extend_from_slice(executions);
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Store> {
        Box::new(self.clone())
    }
}

/// Staging pool mock: a flat list, sorted on snapshot
#[derive(Clone, Default)]
pub struct MockStagePolicy {
    staged: Arc<Mutex<Vec<Transaction>>>,
    ignored: Arc<Mutex<Vec<TransactionId>>>,
}

impl MockStagePolicy {
    /// Stage a transaction.
    pub fn stage(&self, tx: Transaction) {
        self.staged.lock().push(tx);
    }

    /// Stage a batch of transactions.
    pub fn stage_all(&self, txs: Vec<Transaction>) {
        self.staged.lock().extend(txs);
    }

    /// Transactions still in the pool.
    pub fn staged(&self) -> Vec<Transaction> {
        self.staged.lock().clone()
    }

    /// Ids evicted through `ignore`, in eviction order.
    pub fn ignored(&self) -> Vec<TransactionId> {
        self.ignored.lock().clone()
    }
}

impl StagePolicy for MockStagePolicy {
    fn list_staged(&self, _chain_id: ChainId, priority: Option<&TxPriority>) -> Vec<Transaction> {
        let mut txs = self.staged.lock().clone();
        match priority {
            Some(priority) => txs.sort_by(|a, b| {
                priority(a, b).then_with(|| (a.signer, a.nonce).cmp(&(b.signer, b.nonce)))
            }),
            None => txs.sort_by(|a, b| (a.signer, a.nonce).cmp(&(b.signer, b.nonce))),
        }
        txs
    }

    fn ignore(&self, _chain_id: ChainId, id: &TransactionId) {
        self.staged.lock().retain(|tx| tx.id != *id);
        self.ignored.lock().push(*id);
    }

    fn clone_box(&self) -> Box<dyn StagePolicy> {
        Box::new(self.clone())
    }
}

/// Evaluator mock: derives a pseudo state root from the pre-evaluation hash,
/// signs it with the proposer key, and reports a failure for every
/// transaction registered through `fail_transaction`
#[derive(Clone, Default)]
pub struct MockActionEvaluator {
    failing: Arc<Mutex<DigestSet<TransactionId>>>,
}

impl MockActionEvaluator {
    /// Make the evaluation of the given transaction report a failure.
    pub fn fail_transaction(&self, id: TransactionId) {
        self.failing.lock().insert(id);
    }
}

impl ActionEvaluator for MockActionEvaluator {
    fn evaluate(
        &self,
        block: PreEvaluationBlock,
        proposer_key: &KeyPair,
        _chain: &dyn ChainController,
    ) -> Result<(Block, Vec<ActionEvaluation>), EvaluationError> {
        let state_root_hash = Hash::compute_from(block.pre_evaluation_hash.to_bytes());
        let signature = proposer_key
            .sign(&state_root_hash)
            .map_err(|err| EvaluationError::GenericError(err.to_string()))?;
        let mut id_data = Vec::new();
        id_data.extend_from_slice(block.pre_evaluation_hash.to_bytes());
        id_data.extend_from_slice(state_root_hash.to_bytes());
        id_data.extend_from_slice(&signature.to_bytes());
        let id = BlockId(Hash::compute_from(&id_data));

        let failing = self.failing.lock();
        let evaluations = block
            .content
            .transactions
            .iter()
            .map(|tx| ActionEvaluation {
                transaction: Some(tx.id),
                exception: failing
                    .contains(&tx.id)
                    .then(|| "mock action failure".to_string()),
            })
            .collect();
        drop(failing);

        Ok((
            Block {
                content: block.content,
                nonce: block.nonce,
                pre_evaluation_hash: block.pre_evaluation_hash,
                state_root_hash,
                signature: Some(signature),
                id,
            },
            evaluations,
        ))
    }

    fn clone_box(&self) -> Box<dyn ActionEvaluator> {
        Box::new(self.clone())
    }
}
