// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>
//! Unsigned time management
#![warn(missing_docs)]

mod error;
pub use error::TimeError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Time structure used everywhere.
/// Milliseconds since 01/01/1970, UTC.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmberTime(u64);

impl fmt::Display for EmberTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl EmberTime {
    /// Current UTC time.
    pub fn now() -> Result<Self, TimeError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::ConversionError)?
            .as_millis();
        Ok(EmberTime(
            millis.try_into().map_err(|_| TimeError::TimeOverflowError)?,
        ))
    }

    /// Build from a raw millisecond count.
    pub const fn from_millis(millis: u64) -> Self {
        EmberTime(millis)
    }

    /// Raw millisecond count.
    pub const fn to_millis(&self) -> u64 {
        self.0
    }

    /// Conversion to a `std::time::Duration` relative to the epoch
    /// (or relative to nothing when the value is used as a duration).
    pub const fn to_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Saturating addition.
    pub const fn saturating_add(self, t: EmberTime) -> EmberTime {
        EmberTime(self.0.saturating_add(t.0))
    }

    /// Saturating subtraction.
    pub const fn saturating_sub(self, t: EmberTime) -> EmberTime {
        EmberTime(self.0.saturating_sub(t.0))
    }

    /// Checked addition.
    pub fn checked_add(self, t: EmberTime) -> Result<EmberTime, TimeError> {
        self.0
            .checked_add(t.0)
            .ok_or(TimeError::TimeOverflowError)
            .map(EmberTime)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, t: EmberTime) -> Result<EmberTime, TimeError> {
        self.0
            .checked_sub(t.0)
            .ok_or(TimeError::TimeOverflowError)
            .map(EmberTime)
    }

    /// RFC3339 rendering for logs; falls back to the raw millisecond count
    /// when the value is out of the calendar range.
    pub fn to_utc_string(&self) -> String {
        OffsetDateTime::from_unix_timestamp_nanos((self.0 as i128) * 1_000_000)
            .ok()
            .and_then(|date| date.format(&Rfc3339).ok())
            .unwrap_or_else(|| self.0.to_string())
    }
}

impl TryFrom<Duration> for EmberTime {
    type Error = TimeError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Ok(EmberTime(
            value
                .as_millis()
                .try_into()
                .map_err(|_| TimeError::ConversionError)?,
        ))
    }
}

impl From<EmberTime> for Duration {
    fn from(value: EmberTime) -> Self {
        value.to_duration()
    }
}
