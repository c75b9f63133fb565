// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>
//! Core data model of the ember node: addresses, transactions, blocks and
//! their identifiers, plus the digest-keyed map specializations used by hot
//! paths.
#![warn(missing_docs)]

pub mod address;
pub mod block;
pub mod chain;
pub mod error;
pub mod execution;
pub mod maps;
pub mod transaction;
