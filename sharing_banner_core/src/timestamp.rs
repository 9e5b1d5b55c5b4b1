//! Timestamps and clocks.

use core::time::Duration;

/// A timestamp represented as milliseconds since the Unix epoch.
///
/// Millisecond precision matches what the browser hands out via `Date.now()`
/// and what the cache writes into its `expiration` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimestampMillis(u64);

impl TimestampMillis {
    /// Create a new timestamp from milliseconds since the Unix epoch.
    #[must_use]
    pub const fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current timestamp from the system clock.
    ///
    /// A system clock set before the Unix epoch reads as the epoch.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn now() -> Self {
        let duration = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as u64)
    }

    /// Get the raw milliseconds value.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Add a duration, saturating at [`u64::MAX`].
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn saturating_add(&self, duration: Duration) -> Self {
        let millis = duration.as_millis();
        if millis > u64::MAX as u128 {
            Self(u64::MAX)
        } else {
            Self(self.0.saturating_add(millis as u64))
        }
    }
}

/// A source of the current time.
///
/// Injected wherever expiry is computed so tests can move time by hand.
pub trait Clock {
    /// The current time.
    fn now(&self) -> TimestampMillis;
}

/// A [`Clock`] backed by [`std::time::SystemTime`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimestampMillis {
        TimestampMillis::now()
    }
}
