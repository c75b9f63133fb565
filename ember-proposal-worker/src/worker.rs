// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use crate::proposer::BlockProposer;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use ember_models::block::Block;
use ember_proposal_exports::{
    ProposalChannels, ProposalConfig, ProposalController, ProposalError, ProposalManager,
    ProposalResult, ProposeOptions,
};
use ember_signature::KeyPair;
use std::thread::JoinHandle;
use tracing::{info, warn};

/// Requests the worker thread serves
pub(crate) enum Command {
    /// propose one block and send back the outcome
    Propose {
        options: ProposeOptions,
        response_tx: Sender<ProposalResult<Block>>,
    },
}

/// Structure gathering all elements needed by the proposal thread
pub(crate) struct ProposalThread {
    proposer: BlockProposer,
    keypair: KeyPair,
    command_rx: Receiver<Command>,
    stop_rx: Receiver<()>,
}

impl ProposalThread {
    /// Spawns the worker thread serving proposal requests one at a time,
    /// which is what serializes proposals on the chain.
    pub(crate) fn spawn(
        config: ProposalConfig,
        keypair: KeyPair,
        channels: ProposalChannels,
        command_rx: Receiver<Command>,
        stop_rx: Receiver<()>,
    ) -> JoinHandle<()> {
        std::thread::Builder::new()
            .name("block proposal worker".into())
            .spawn(move || {
                let this = ProposalThread {
                    proposer: BlockProposer::new(config, channels),
                    keypair,
                    command_rx,
                    stop_rx,
                };
                this.run();
            })
            .expect("could not spawn block proposal worker thread")
    }

    /// main run loop of the proposal worker thread
    fn run(self) {
        loop {
            select! {
                recv(self.stop_rx) -> _ => break,
                recv(self.command_rx) -> command => match command {
                    Ok(Command::Propose { options, response_tx }) => {
                        let result = self.proposer.propose(&self.keypair, options);
                        if let Err(err) = &result {
                            warn!("block proposal failed: {}", err);
                        }
                        if response_tx.send(result).is_err() {
                            warn!("proposal requester dropped before receiving the result");
                        }
                    }
                    // every controller is gone
                    Err(_) => break,
                },
            }
        }
    }
}

#[derive(Clone)]
pub(crate) struct ProposalControllerImpl {
    pub(crate) command_tx: Sender<Command>,
}

impl ProposalController for ProposalControllerImpl {
    fn propose(&self, options: ProposeOptions) -> ProposalResult<Block> {
        let (response_tx, response_rx) = bounded(1);
        self.command_tx
            .send(Command::Propose {
                options,
                response_tx,
            })
            .map_err(|_| {
                ProposalError::ChannelError("the proposal worker is not running".into())
            })?;
        response_rx.recv().map_err(|_| {
            ProposalError::ChannelError("the proposal worker dropped the request".into())
        })?
    }

    fn clone_box(&self) -> Box<dyn ProposalController> {
        Box::new(self.clone())
    }
}

pub(crate) struct ProposalManagerImpl {
    pub(crate) stop_tx: Option<Sender<()>>,
    pub(crate) thread_handle: Option<JoinHandle<()>>,
}

impl ProposalManager for ProposalManagerImpl {
    fn stop(&mut self) {
        info!("stopping the proposal worker...");
        // dropping the stop sender interrupts the run loop
        drop(self.stop_tx.take());
        if let Some(handle) = self.thread_handle.take() {
            handle.join().expect("proposal worker thread panicked");
        }
        info!("proposal worker stopped");
    }
}
