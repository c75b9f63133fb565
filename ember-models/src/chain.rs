// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! Chain identity and tip summaries.

use crate::block::BlockId;
use serde::{Deserialize, Serialize};

/// Identifier of a chain, fixed at genesis
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of the last block on the main branch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipInfo {
    /// hash of the tip block
    pub id: BlockId,
    /// height of the tip block
    pub index: u64,
    /// cumulative difficulty from genesis through the tip
    pub total_difficulty: u128,
}
