// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! Action evaluation and transaction execution records.

use crate::block::BlockId;
use crate::transaction::TransactionId;
use serde::{Deserialize, Serialize};

/// Outcome of executing one action of a block.
///
/// `transaction` is absent for block-level actions that are not tied to a
/// particular transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvaluation {
    /// transaction the action belongs to, if any
    pub transaction: Option<TransactionId>,
    /// rendering of the failure, if the action raised one
    pub exception: Option<String>,
}

/// Per-transaction execution record persisted after evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxExecution {
    /// block the transaction was included in
    pub block: BlockId,
    /// the executed transaction
    pub transaction: TransactionId,
    /// whether every action of the transaction executed without failure
    pub success: bool,
}
