// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use displaydoc::Display;
use thiserror::Error;

/// time error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum TimeError {
    /// time overflow error
    TimeOverflowError,
    /// time conversion error
    ConversionError,
}
