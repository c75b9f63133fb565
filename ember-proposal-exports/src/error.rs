// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use displaydoc::Display;
use ember_time::TimeError;
use thiserror::Error;

/// proposal result
pub type ProposalResult<T, E = ProposalError> = core::result::Result<T, E>;

/// proposal error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum ProposalError {
    /// not enough gatherable transactions: gathered {got}, policy requires {min}
    InsufficientTransactions {
        /// transactions actually gathered
        got: usize,
        /// policy minimum for the target index
        min: usize,
    },
    /// proposal cancelled: {0}
    Cancelled(CancelReason),
    /// store error: {0}
    StoreError(#[from] StoreError),
    /// evaluation error: {0}
    EvaluationError(#[from] EvaluationError),
    /// chain error: {0}
    ChainError(#[from] ChainError),
    /// time error: {0}
    TimeError(#[from] TimeError),
    /// channel error: {0}
    ChannelError(String),
}

/// Cause of a mining abort
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// the chain tip moved during mining
    TipChanged,
    /// the caller cancelled the proposal
    Caller,
}

/// staged transaction rejected: {reason}
#[derive(Display, Error, Debug, Clone)]
pub struct PolicyViolation {
    /// human-readable rejection reason
    pub reason: String,
}

/// store error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum StoreError {
    /// no block hash indexed at height {0}
    MissingBlockHash(u64),
    /// generic store error: {0}
    GenericError(String),
}

/// action evaluation error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum EvaluationError {
    /// generic evaluation error: {0}
    GenericError(String),
}

/// chain error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum ChainError {
    /// generic chain error: {0}
    GenericError(String),
}
