// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>
//! Test harness and generators shared by the proposal scenarios.

use ember_hash::Hash;
use ember_models::address::Address;
use ember_models::block::{BlockId, BlockMetadata};
use ember_models::chain::{ChainId, TipInfo};
use ember_models::maps::DigestMap;
use ember_models::transaction::{Transaction, TransactionId};
use ember_proposal_exports::test_exports::{
    MockActionEvaluator, MockChainController, MockPolicyController, MockStagePolicy, MockStore,
    TestCodec,
};
use ember_proposal_exports::{
    BlockCodec, ProposalChannels, ProposalConfig, ProposalResult, TxPriority,
};
use ember_signature::KeyPair;
use ember_time::EmberTime;
use std::sync::Arc;

use crate::gather::{GatherLimits, TransactionGatherer};
use crate::metadata::build_next_metadata;
use crate::proposer::BlockProposer;

/// Fixed block timestamp used by deterministic scenarios.
pub const FIXED_TIMESTAMP: EmberTime = EmberTime::from_millis(1_700_000_000_000);

/// Builder generating signed test transactions, in the spirit of a staged
/// pool fed by a wallet.
pub struct TxGenerator {
    keypair: KeyPair,
    nonce: u64,
    timestamp: EmberTime,
    payload_size: usize,
}

impl Default for TxGenerator {
    fn default() -> Self {
        TxGenerator {
            keypair: KeyPair::generate(),
            nonce: 0,
            timestamp: EmberTime::from_millis(1_000),
            payload_size: 32,
        }
    }
}

impl TxGenerator {
    pub fn with_keypair(keypair: KeyPair) -> Self {
        TxGenerator {
            keypair,
            ..Default::default()
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn payload_size(mut self, payload_size: usize) -> Self {
        self.payload_size = payload_size;
        self
    }

    pub fn signer_address(&self) -> Address {
        Address::from_public_key(&self.keypair.get_public_key())
    }

    /// Generates the transaction, stamping its encoded size with the codec.
    pub fn generate(&self, codec: &dyn BlockCodec) -> Transaction {
        let signer = self.signer_address();
        let tag = Hash::compute_from(
            &[
                signer.to_bytes().as_slice(),
                self.nonce.to_be_bytes().as_slice(),
                (self.payload_size as u64).to_be_bytes().as_slice(),
            ]
            .concat(),
        );
        let mut payload = vec![0u8; self.payload_size];
        for (i, byte) in payload.iter_mut().enumerate() {
            *byte = tag.to_bytes()[i % ember_hash::HASH_SIZE_BYTES];
        }
        let id = TransactionId(Hash::compute_from(
            &[tag.to_bytes().as_slice(), payload.as_slice()].concat(),
        ));
        let signature = self.keypair.sign(&id.0).expect("transaction signing failed");
        let mut tx = Transaction {
            id,
            signer,
            nonce: self.nonce,
            timestamp: self.timestamp,
            payload,
            signature,
            serialized_size: 0,
        };
        tx.serialized_size = codec.transaction_encoded_len(&tx);
        tx
    }
}

/// All mock collaborators wired together
pub struct TestHarness {
    pub chain: MockChainController,
    pub policy: MockPolicyController,
    pub store: MockStore,
    pub stage: MockStagePolicy,
    pub evaluator: MockActionEvaluator,
    pub codec: Arc<TestCodec>,
}

impl TestHarness {
    pub fn new() -> Self {
        TestHarness {
            chain: MockChainController::new(ChainId(7)),
            policy: MockPolicyController::default(),
            store: MockStore::default(),
            stage: MockStagePolicy::default(),
            evaluator: MockActionEvaluator::default(),
            codec: Arc::new(TestCodec),
        }
    }

    /// Installs a genesis tip with total difficulty 1 and indexes its hash.
    pub fn seed_genesis(&self) -> BlockId {
        let id = BlockId(Hash::compute_from(b"genesis"));
        self.chain.seed_tip(TipInfo {
            id,
            index: 0,
            total_difficulty: 1,
        });
        self.store.set_block_hash(0, id);
        id
    }

    pub fn channels(&self) -> ProposalChannels {
        let codec: Arc<dyn BlockCodec> = self.codec.clone();
        ProposalChannels {
            chain: Box::new(self.chain.clone()),
            policy: Box::new(self.policy.clone()),
            store: Box::new(self.store.clone()),
            stage: Box::new(self.stage.clone()),
            evaluator: Box::new(self.evaluator.clone()),
            codec,
        }
    }

    pub fn proposer(&self, config: ProposalConfig) -> BlockProposer {
        BlockProposer::new(config, self.channels())
    }

    /// The metadata the proposer would assemble at the current chain state.
    pub fn metadata(&self, proposer_key: &KeyPair) -> BlockMetadata {
        build_next_metadata(
            &self.chain,
            &self.policy,
            &self.store,
            proposer_key.get_public_key(),
            FIXED_TIMESTAMP,
        )
        .expect("metadata assembly failed")
    }

    /// Runs one gathering pass with the harness collaborators.
    pub fn gather(
        &self,
        config: &ProposalConfig,
        metadata: &BlockMetadata,
        limits: &GatherLimits,
        priority: Option<&TxPriority>,
    ) -> ProposalResult<Vec<Transaction>> {
        let codec: &dyn BlockCodec = self.codec.as_ref();
        let gatherer = TransactionGatherer {
            chain: &self.chain,
            policy: &self.policy,
            store: &self.store,
            stage: &self.stage,
            codec,
            budget: config.gather_budget.to_duration(),
        };
        gatherer.gather(metadata, limits, priority)
    }
}

/// Caps wide enough to never interfere
pub fn roomy_limits() -> GatherLimits {
    GatherLimits {
        max_block_bytes: 1_000_000_000,
        max_transactions: 1_024,
        max_transactions_per_signer: 1_024,
    }
}

/// A comparator pinning the snapshot to the given transaction order.
pub fn priority_by_order(txs: &[Transaction]) -> TxPriority {
    let ranks: DigestMap<TransactionId, usize> = txs
        .iter()
        .enumerate()
        .map(|(rank, tx)| (tx.id, rank))
        .collect();
    Arc::new(move |a: &Transaction, b: &Transaction| ranks[&a.id].cmp(&ranks[&b.id]))
}
