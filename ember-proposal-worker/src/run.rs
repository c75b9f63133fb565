// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use crossbeam_channel::unbounded;
use ember_proposal_exports::{
    ProposalChannels, ProposalConfig, ProposalController, ProposalManager,
};
use ember_signature::KeyPair;

use crate::worker::{ProposalControllerImpl, ProposalManagerImpl, ProposalThread};

/// Launches a proposal worker thread and returns a pair to interact with it.
///
/// # Arguments
/// * `config`: proposal configuration
/// * `keypair`: the proposer's keypair
/// * `channels`: the collaborators the worker talks to
///
/// # Return value
/// A pair `(proposal_manager, proposal_controller)` where:
/// * `proposal_manager`: allows stopping the worker cleanly
/// * `proposal_controller`: allows requesting block proposals
pub fn start_proposal_worker(
    config: ProposalConfig,
    keypair: KeyPair,
    channels: ProposalChannels,
) -> (Box<dyn ProposalManager>, Box<dyn ProposalController>) {
    let (command_tx, command_rx) = unbounded();
    let (stop_tx, stop_rx) = unbounded::<()>();

    let thread_handle = ProposalThread::spawn(config, keypair, channels, command_rx, stop_rx);

    let manager = ProposalManagerImpl {
        stop_tx: Some(stop_tx),
        thread_handle: Some(thread_handle),
    };
    let controller = ProposalControllerImpl { command_tx };

    (Box::new(manager), Box::new(controller))
}
