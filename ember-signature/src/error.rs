// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use displaydoc::Display;
use thiserror::Error;

/// signature result
pub type SignatureResult<T, E = EmberSignatureError> = core::result::Result<T, E>;

/// signature error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum EmberSignatureError {
    /// parsing error: {0}
    ParsingError(String),
    /// signature verification error: {0}
    VerificationError(String),
    /// wrong byte length: expected {0}, got {1}
    WrongLength(usize, usize),
}
