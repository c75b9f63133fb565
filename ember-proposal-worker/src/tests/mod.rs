// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

mod mining_scenarios;
mod proposer_scenarios;
mod tools;
