// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use crossbeam_channel::{never, select, unbounded, Receiver, Sender};
use ember_hash::Hash;
use ember_models::block::{BlockContent, PreEvaluationBlock};
use ember_proposal_exports::{BlockCodec, CancelReason, ProposalError, ProposalResult, TipChanged};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::debug;

/// Runs the proof-of-work search on the assembled block content.
///
/// Worker `w` of `n` walks the nonces `w, w + n, w + 2n, ...`; the first one
/// to satisfy the difficulty wins and its siblings are stopped. The
/// coordinator waits on the result while watching the tip-change subscription
/// and the caller's cancel signal; when both have fired, the tip change is
/// reported as the cause. Workers observe a stop request within
/// `cancel_check_interval` hash attempts.
///
/// All spawned workers are joined before returning, and the tip-change
/// receiver is consumed, so every exit path releases the subscription.
pub(crate) fn mine(
    codec: &dyn BlockCodec,
    content: BlockContent,
    threads: usize,
    cancel_check_interval: u64,
    tip_changes: Receiver<TipChanged>,
    cancel: Option<Receiver<()>>,
) -> ProposalResult<PreEvaluationBlock> {
    let difficulty = content.metadata.difficulty;
    let threads = threads.max(1);
    let cancel_check_interval = cancel_check_interval.max(1);
    let stop = AtomicBool::new(false);
    let (found_tx, found_rx) = unbounded::<(u64, Hash)>();
    let cancel = cancel.unwrap_or_else(never);
    let content_ref = &content;
    let stop_ref = &stop;

    let outcome = thread::scope(|scope| {
        for worker in 0..threads {
            let found_tx = found_tx.clone();
            scope.spawn(move || {
                search(
                    codec,
                    content_ref,
                    difficulty,
                    worker as u64,
                    threads as u64,
                    cancel_check_interval,
                    stop_ref,
                    found_tx,
                )
            });
        }
        drop(found_tx);

        let mut tip_changes = tip_changes;
        let outcome = loop {
            select! {
                recv(found_rx) -> msg => match msg {
                    Ok(found) => {
                        // a tip change delivered before the result still wins
                        if tip_changes.try_recv().is_ok() {
                            break Err(ProposalError::Cancelled(CancelReason::TipChanged));
                        }
                        break Ok(found);
                    }
                    Err(_) => break Err(ProposalError::ChannelError(
                        "mining workers terminated without a result".into(),
                    )),
                },
                recv(tip_changes) -> msg => match msg {
                    Ok(event) => {
                        debug!(
                            "tip changed to {} during mining, aborting the search",
                            event.new_tip
                        );
                        break Err(ProposalError::Cancelled(CancelReason::TipChanged));
                    }
                    // the chain dropped its side: keep mining, stop watching
                    Err(_) => tip_changes = never(),
                },
                recv(cancel) -> _ => {
                    // a pending tip change is the more informative cause
                    let reason = if tip_changes.try_recv().is_ok() {
                        CancelReason::TipChanged
                    } else {
                        CancelReason::Caller
                    };
                    break Err(ProposalError::Cancelled(reason));
                }
            }
        };
        stop.store(true, Ordering::Relaxed);
        outcome
    });

    let (nonce, pre_evaluation_hash) = outcome?;
    debug!(
        "found nonce {} for the block at index {}",
        nonce, content.metadata.index
    );
    Ok(PreEvaluationBlock {
        content,
        nonce,
        pre_evaluation_hash,
    })
}

/// One search thread over a disjoint nonce partition.
#[allow(clippy::too_many_arguments)]
fn search(
    codec: &dyn BlockCodec,
    content: &BlockContent,
    difficulty: u64,
    start: u64,
    stride: u64,
    cancel_check_interval: u64,
    stop: &AtomicBool,
    found: Sender<(u64, Hash)>,
) {
    let mut nonce = start;
    let mut attempts: u64 = 0;
    loop {
        if attempts % cancel_check_interval == 0 && stop.load(Ordering::Relaxed) {
            return;
        }
        let hash = codec.pre_evaluation_hash(content, nonce);
        if codec.meets_difficulty(&hash, difficulty) {
            stop.store(true, Ordering::Relaxed);
            // the coordinator may already be gone on a concurrent find
            let _ = found.send((nonce, hash));
            return;
        }
        nonce = nonce.wrapping_add(stride);
        attempts = attempts.wrapping_add(1);
    }
}
