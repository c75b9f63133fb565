// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! Models error.

use displaydoc::Display;
use thiserror::Error;

/// models result
pub type ModelsResult<T, E = ModelsError> = core::result::Result<T, E>;

/// models error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum ModelsError {
    /// `ember_hash` error: {0}
    HashError(#[from] ember_hash::EmberHashError),
    /// `ember_signature` error: {0}
    SignatureError(#[from] ember_signature::EmberSignatureError),
    /// time error: {0}
    TimeError(#[from] ember_time::TimeError),
    /// address parsing error: {0}
    AddressParseError(String),
    /// block id parsing error
    BlockIdParseError,
    /// transaction id parsing error
    TransactionIdParseError,
}
