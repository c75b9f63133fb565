// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>
//! Definition and exports of the block proposal interfaces.
//!
//! Defines the configuration of the proposal worker, the traits of the
//! collaborators it consumes (chain handle, consensus policy, store, staging
//! pool, action evaluator, block codec), the worker controller/manager pair,
//! the error types, and the mocks used by the test suites.

#![warn(missing_docs)]

mod config;
mod controller_traits;
mod error;
mod types;

pub use config::ProposalConfig;
pub use controller_traits::{
    ActionEvaluator, BlockCodec, ChainController, PolicyController, ProposalController,
    ProposalManager, StagePolicy, Store,
};
pub use error::{
    CancelReason, ChainError, EvaluationError, PolicyViolation, ProposalError, ProposalResult,
    StoreError,
};
pub use types::{ProposalChannels, ProposeOptions, TipChanged, TxPriority};

#[cfg(feature = "testing")]
pub mod test_exports;
