//! Monotonic time source for freshness computation.
//!
//! Timestamps embedded in messages are microseconds of the system's
//! monotonic clock (`CLOCK_MONOTONIC`), so `now` must come from the same
//! clock for "seconds ago" to be meaningful.

use nix::time::{ClockId, clock_gettime};

use crate::consts::USEC_PER_SEC;

/// Monotonic clock reading in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MonotonicTime(pub u64);

impl MonotonicTime {
    #[inline]
    pub const fn from_micros(us: u64) -> Self {
        Self(us)
    }

    #[inline]
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Seconds elapsed from `stamp` to `self`.
    ///
    /// Negative when `stamp` lies in the future (clock skew or wraparound).
    /// Not clamped.
    pub fn seconds_since(self, stamp: u64) -> f64 {
        // Wrapping difference reinterpreted as signed keeps small negative
        // skews negative instead of producing a huge positive value.
        let delta = self.0.wrapping_sub(stamp) as i64;
        delta as f64 / USEC_PER_SEC
    }
}

impl From<u64> for MonotonicTime {
    fn from(us: u64) -> Self {
        Self(us)
    }
}

/// Source of monotonic time samples.
pub trait Clock {
    /// Current reading. Syscall failures propagate as `Errno`.
    fn now(&self) -> nix::Result<MonotonicTime>;
}

/// `CLOCK_MONOTONIC` via `clock_gettime(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMonotonic;

impl Clock for SystemMonotonic {
    fn now(&self) -> nix::Result<MonotonicTime> {
        let ts = clock_gettime(ClockId::CLOCK_MONOTONIC)?;
        let us = (ts.tv_sec() as u64)
            .saturating_mul(1_000_000)
            .saturating_add(ts.tv_nsec() as u64 / 1_000);
        Ok(MonotonicTime(us))
    }
}

/// Clock frozen at a fixed reading. Used for replay and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub MonotonicTime);

impl Clock for FixedClock {
    fn now(&self) -> nix::Result<MonotonicTime> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_since_positive() {
        let now = MonotonicTime(1_000_000 + 2_500_000);
        assert_eq!(now.seconds_since(1_000_000), 2.5);
    }

    #[test]
    fn seconds_since_negative_not_clamped() {
        let now = MonotonicTime(1_000_000);
        assert_eq!(now.seconds_since(1_500_000), -0.5);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemMonotonic;
        let a = clock.now().unwrap();
        let b = clock.now().unwrap();
        assert!(b >= a);
        assert!(a.as_micros() > 0);
    }

    #[test]
    fn fixed_clock() {
        let clock = FixedClock(MonotonicTime::from_micros(77));
        assert_eq!(clock.now(), Ok(MonotonicTime(77)));
    }
}
