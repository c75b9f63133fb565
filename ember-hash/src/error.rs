// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use displaydoc::Display;
use thiserror::Error;

/// hash result
pub type HashResult<T, E = EmberHashError> = core::result::Result<T, E>;

/// hash error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum EmberHashError {
    /// parsing error: {0}
    ParsingError(String),
    /// wrong hash size: expected {0} bytes, got {1}
    WrongHashSize(usize, usize),
}
