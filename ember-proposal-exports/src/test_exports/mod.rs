// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>
//! Test tooling for the proposal module: in-memory mock collaborators and a
//! deterministic fixed-layout codec.

mod codec;
mod mock;

pub use codec::TestCodec;
pub use mock::{
    MockActionEvaluator, MockChainController, MockPolicyController, MockStagePolicy, MockStore,
};
