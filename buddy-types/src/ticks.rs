//! Tick-based instants for persisted expiry stamps.
//!
//! A tick is 100 nanoseconds; tick zero is 0001-01-01T00:00:00 UTC. Settings
//! files written by earlier SDK releases carry these values, so the unit and
//! epoch are fixed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Ticks per second (one tick is 100 ns).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Tick count of 1970-01-01T00:00:00 UTC.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// An instant expressed in 100 ns ticks since 0001-01-01 UTC.
///
/// `Ticks::NEVER` (zero) is reserved to mean "no expiry".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticks(i64);

impl Ticks {
    /// The "never expires" marker.
    pub const NEVER: Ticks = Ticks(0);

    /// Creates ticks from a raw count.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw tick count.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Converts a UTC instant to ticks, saturating at the `i64` bounds.
    #[must_use]
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        let whole = instant.timestamp().saturating_mul(TICKS_PER_SECOND);
        let fraction = i64::from(instant.timestamp_subsec_nanos() / 100);
        Self(
            UNIX_EPOCH_TICKS
                .saturating_add(whole)
                .saturating_add(fraction),
        )
    }

    /// Converts back to a UTC instant.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        let since_epoch = self
            .0
            .checked_sub(UNIX_EPOCH_TICKS)
            .ok_or(Error::InvalidTicks(self.0))?;
        let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
        let nanos = (since_epoch.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
        DateTime::from_timestamp(secs, nanos).ok_or(Error::InvalidTicks(self.0))
    }

    /// Returns true for the "never expires" marker.
    #[must_use]
    pub const fn is_never(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if this is a real expiry stamp at or before `now`.
    ///
    /// Zero and negative counts never expire.
    #[must_use]
    pub fn has_passed(&self, now: DateTime<Utc>) -> bool {
        self.0 > 0 && *self <= Self::from_datetime(now)
    }
}

impl Default for Ticks {
    fn default() -> Self {
        Self::NEVER
    }
}

impl From<DateTime<Utc>> for Ticks {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_datetime(instant)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ticks {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}
