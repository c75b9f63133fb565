// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! This file defines the proposal worker settings

use ember_time::EmberTime;

/// Structure defining the settings of the proposal worker
#[derive(Debug, Clone)]
pub struct ProposalConfig {
    /// soft wall-clock budget for one transaction gathering pass
    pub gather_budget: EmberTime,
    /// number of parallel proof-of-work search threads
    pub mining_threads: usize,
    /// hash attempts between two cancellation checks in a search thread
    pub cancel_check_interval: u64,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        ProposalConfig {
            gather_budget: EmberTime::from_millis(4_000),
            mining_threads: 2,
            cancel_check_interval: 256,
        }
    }
}
