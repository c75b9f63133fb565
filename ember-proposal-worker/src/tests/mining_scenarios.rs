// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>
//! Proof-of-work search scenarios: success, cancellation and determinism.

use super::tools::{TestHarness, TxGenerator};
use crate::mining::mine;
use ember_hash::Hash;
use ember_models::block::{BlockContent, BlockId};
use ember_proposal_exports::{
    BlockCodec, CancelReason, ProposalError, TipChanged,
};
use ember_signature::KeyPair;

fn sample_content(harness: &TestHarness, difficulty: u64) -> BlockContent {
    harness.seed_genesis();
    let proposer_key = KeyPair::from_bytes(&[11u8; 32]);
    let mut metadata = harness.metadata(&proposer_key);
    metadata.difficulty = difficulty;
    let tx = TxGenerator::with_keypair(KeyPair::from_bytes(&[12u8; 32]))
        .generate(harness.codec.as_ref());
    BlockContent {
        metadata,
        transactions: vec![tx],
    }
}

#[test]
fn finds_a_nonce_satisfying_the_difficulty() {
    let harness = TestHarness::new();
    let content = sample_content(&harness, 1);
    let (_tip_tx, tip_rx) = crossbeam_channel::unbounded::<TipChanged>();

    let mined = mine(harness.codec.as_ref(), content.clone(), 2, 64, tip_rx, None).unwrap();

    assert_eq!(mined.content, content);
    assert!(harness
        .codec
        .meets_difficulty(&mined.pre_evaluation_hash, content.metadata.difficulty));
    assert_eq!(
        mined.pre_evaluation_hash,
        harness.codec.pre_evaluation_hash(&content, mined.nonce)
    );
}

#[test]
fn caller_cancel_aborts_the_search() {
    let harness = TestHarness::new();
    let content = sample_content(&harness, u64::MAX);
    let (_tip_tx, tip_rx) = crossbeam_channel::unbounded::<TipChanged>();
    let (cancel_tx, cancel_rx) = crossbeam_channel::unbounded::<()>();
    cancel_tx.send(()).unwrap();

    let err = mine(
        harness.codec.as_ref(),
        content,
        2,
        64,
        tip_rx,
        Some(cancel_rx),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ProposalError::Cancelled(CancelReason::Caller)
    ));
}

#[test]
fn tip_change_aborts_the_search() {
    let harness = TestHarness::new();
    let content = sample_content(&harness, u64::MAX);
    let (tip_tx, tip_rx) = crossbeam_channel::unbounded::<TipChanged>();
    tip_tx
        .send(TipChanged {
            old_tip: None,
            new_tip: BlockId(Hash::compute_from(b"other block")),
        })
        .unwrap();

    let err = mine(harness.codec.as_ref(), content, 2, 64, tip_rx, None).unwrap_err();
    assert!(matches!(
        err,
        ProposalError::Cancelled(CancelReason::TipChanged)
    ));
}

#[test]
fn tip_change_outranks_caller_cancel() {
    let harness = TestHarness::new();
    let content = sample_content(&harness, u64::MAX);
    let (tip_tx, tip_rx) = crossbeam_channel::unbounded::<TipChanged>();
    let (cancel_tx, cancel_rx) = crossbeam_channel::unbounded::<()>();
    tip_tx
        .send(TipChanged {
            old_tip: None,
            new_tip: BlockId(Hash::compute_from(b"other block")),
        })
        .unwrap();
    cancel_tx.send(()).unwrap();

    let err = mine(
        harness.codec.as_ref(),
        content,
        2,
        64,
        tip_rx,
        Some(cancel_rx),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ProposalError::Cancelled(CancelReason::TipChanged)
    ));
}

#[test]
fn single_threaded_search_is_deterministic() {
    let harness = TestHarness::new();
    // a quarter of the nonce space passes, so the first hit takes a few tries
    let content = sample_content(&harness, 4);
    let (_tip_tx, tip_rx) = crossbeam_channel::unbounded::<TipChanged>();
    let first = mine(harness.codec.as_ref(), content.clone(), 1, 64, tip_rx, None).unwrap();

    let (_tip_tx, tip_rx) = crossbeam_channel::unbounded::<TipChanged>();
    let second = mine(harness.codec.as_ref(), content, 1, 64, tip_rx, None).unwrap();

    assert_eq!(first.nonce, second.nonce);
    assert_eq!(first.pre_evaluation_hash, second.pre_evaluation_hash);
}
