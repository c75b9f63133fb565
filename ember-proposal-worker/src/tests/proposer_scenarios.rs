// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>
//! End-to-end proposal scenarios against the mock collaborators.

use super::tools::{TestHarness, TxGenerator, FIXED_TIMESTAMP};
use crate::run::start_proposal_worker;
use ember_proposal_exports::{
    BlockCodec, CancelReason, ChainController, ProposalConfig, ProposalError, ProposeOptions,
};
use ember_signature::KeyPair;
use std::time::Duration;

fn fixed_options() -> ProposeOptions {
    ProposeOptions {
        timestamp: Some(FIXED_TIMESTAMP),
        ..Default::default()
    }
}

#[test]
fn genesis_metadata_has_no_previous_hash() {
    let harness = TestHarness::new();
    let proposer_key = KeyPair::generate();
    let metadata = harness.metadata(&proposer_key);
    assert_eq!(metadata.index, 0);
    assert_eq!(metadata.previous_hash, None);
    assert_eq!(metadata.total_difficulty, 1);
    assert_eq!(metadata.public_key, Some(proposer_key.get_public_key()));
}

#[test]
fn metadata_links_to_the_tip() {
    let harness = TestHarness::new();
    let genesis = harness.seed_genesis();
    let proposer_key = KeyPair::generate();
    let metadata = harness.metadata(&proposer_key);
    assert_eq!(metadata.index, 1);
    assert_eq!(metadata.previous_hash, Some(genesis));
    // genesis carries total difficulty 1, the policy difficulty is 1
    assert_eq!(metadata.total_difficulty, 2);
}

#[test]
fn happy_path_single_signer() {
    let harness = TestHarness::new();
    let genesis = harness.seed_genesis();
    let proposer_key = KeyPair::generate();
    let signer = KeyPair::generate();
    for nonce in 0..2u64 {
        harness.stage.stage(
            TxGenerator::with_keypair(signer.clone())
                .nonce(nonce)
                .generate(harness.codec.as_ref()),
        );
    }

    let proposer = harness.proposer(ProposalConfig::default());
    let block = proposer.propose(&proposer_key, fixed_options()).unwrap();

    assert_eq!(block.index(), 1);
    assert_eq!(block.content.metadata.previous_hash, Some(genesis));
    assert_eq!(block.content.metadata.total_difficulty, 2);
    let nonces: Vec<u64> = block.transactions().iter().map(|tx| tx.nonce).collect();
    assert_eq!(nonces, vec![0, 1]);
    assert!(harness
        .codec
        .meets_difficulty(&block.pre_evaluation_hash, block.content.metadata.difficulty));
    assert!(block.signature.is_some());

    // appended and now the tip
    let appended = harness.chain.appended();
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].id, block.id);
    assert_eq!(harness.chain.tip().unwrap().id, block.id);
    assert_eq!(harness.chain.block_count(), 2);

    // one successful execution record per transaction
    let executions = harness.store.executions();
    assert_eq!(executions.len(), 2);
    assert!(executions.iter().all(|execution| {
        execution.block == block.id && execution.success
    }));
}

#[test]
fn insufficient_transactions_fails_before_mining() {
    let mut harness = TestHarness::new();
    harness.policy.min_transactions = 3;
    harness.seed_genesis();
    let proposer_key = KeyPair::generate();
    let signer = KeyPair::generate();
    for nonce in 0..2u64 {
        harness.stage.stage(
            TxGenerator::with_keypair(signer.clone())
                .nonce(nonce)
                .generate(harness.codec.as_ref()),
        );
    }

    let proposer = harness.proposer(ProposalConfig::default());
    let err = proposer
        .propose(&proposer_key, fixed_options())
        .unwrap_err();

    assert!(matches!(
        err,
        ProposalError::InsufficientTransactions { got: 2, min: 3 }
    ));
    // no append, no state mutation
    assert!(harness.chain.appended().is_empty());
    assert!(harness.store.executions().is_empty());
    assert_eq!(harness.stage.staged().len(), 2);
}

#[test]
fn tip_change_cancels_mining() {
    let mut harness = TestHarness::new();
    // make the search effectively endless
    harness.policy.difficulty = u64::MAX;
    harness.seed_genesis();
    let proposer_key = KeyPair::generate();

    let chain = harness.chain.clone();
    let external = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        chain.external_append(1);
    });

    let proposer = harness.proposer(ProposalConfig::default());
    let err = proposer
        .propose(&proposer_key, fixed_options())
        .unwrap_err();
    external.join().unwrap();

    assert!(matches!(
        err,
        ProposalError::Cancelled(CancelReason::TipChanged)
    ));
    assert!(harness.chain.appended().is_empty());
    assert!(harness.store.executions().is_empty());
}

#[test]
fn caller_cancel_surfaces() {
    let mut harness = TestHarness::new();
    harness.policy.difficulty = u64::MAX;
    harness.seed_genesis();
    let proposer_key = KeyPair::generate();

    let (cancel_tx, cancel_rx) = crossbeam_channel::unbounded::<()>();
    cancel_tx.send(()).unwrap();
    let options = ProposeOptions {
        cancel: Some(cancel_rx),
        ..fixed_options()
    };

    let proposer = harness.proposer(ProposalConfig::default());
    let err = proposer.propose(&proposer_key, options).unwrap_err();

    assert!(matches!(
        err,
        ProposalError::Cancelled(CancelReason::Caller)
    ));
    assert!(harness.chain.appended().is_empty());
}

#[test]
fn append_false_leaves_the_chain_untouched() {
    let harness = TestHarness::new();
    let genesis = harness.seed_genesis();
    let proposer_key = KeyPair::generate();
    let signer = KeyPair::generate();
    harness
        .stage
        .stage(TxGenerator::with_keypair(signer).generate(harness.codec.as_ref()));

    let proposer = harness.proposer(ProposalConfig::default());
    let options = ProposeOptions {
        append: false,
        ..fixed_options()
    };
    let block = proposer.propose(&proposer_key, options).unwrap();

    assert_eq!(block.index(), 1);
    assert!(harness.chain.appended().is_empty());
    assert_eq!(harness.chain.tip().unwrap().id, genesis);
    // execution records are persisted regardless of the append choice
    assert_eq!(harness.store.executions().len(), 1);
}

#[test]
fn failed_evaluations_mark_their_executions() {
    let harness = TestHarness::new();
    harness.seed_genesis();
    let proposer_key = KeyPair::generate();
    let signer = KeyPair::generate();
    let txs: Vec<_> = (0..2u64)
        .map(|nonce| {
            TxGenerator::with_keypair(signer.clone())
                .nonce(nonce)
                .generate(harness.codec.as_ref())
        })
        .collect();
    harness.stage.stage_all(txs.clone());
    harness.evaluator.fail_transaction(txs[1].id);

    let proposer = harness.proposer(ProposalConfig::default());
    let block = proposer.propose(&proposer_key, fixed_options()).unwrap();

    let executions = harness.store.executions();
    assert_eq!(executions.len(), 2);
    let by_id = |id| {
        executions
            .iter()
            .find(|execution| execution.transaction == id)
            .unwrap()
    };
    assert!(by_id(txs[0].id).success);
    assert!(!by_id(txs[1].id).success);
    assert!(executions
        .iter()
        .all(|execution| execution.block == block.id));
}

#[test]
fn proposal_is_deterministic_given_fixed_inputs() {
    let run = || {
        let harness = TestHarness::new();
        harness.seed_genesis();
        let signer = KeyPair::from_bytes(&[3u8; 32]);
        for nonce in 0..2u64 {
            harness.stage.stage(
                TxGenerator::with_keypair(signer.clone())
                    .nonce(nonce)
                    .generate(harness.codec.as_ref()),
            );
        }
        let config = ProposalConfig {
            mining_threads: 1,
            ..Default::default()
        };
        let proposer = harness.proposer(config);
        proposer
            .propose(&KeyPair::from_bytes(&[5u8; 32]), fixed_options())
            .unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.nonce, second.nonce);
    assert_eq!(first.id, second.id);
    assert_eq!(first, second);
}

#[test]
fn worker_serves_proposals_until_stopped() {
    let harness = TestHarness::new();
    harness.seed_genesis();
    let signer = KeyPair::generate();
    harness
        .stage
        .stage(TxGenerator::with_keypair(signer).generate(harness.codec.as_ref()));

    let (mut manager, controller) = start_proposal_worker(
        ProposalConfig::default(),
        KeyPair::generate(),
        harness.channels(),
    );

    let block = controller.propose(fixed_options()).unwrap();
    assert_eq!(block.index(), 1);
    assert_eq!(harness.chain.appended().len(), 1);

    manager.stop();
    // the worker is gone, requests now fail cleanly
    assert!(matches!(
        controller.propose(fixed_options()),
        Err(ProposalError::ChannelError(_))
    ));
}
