//! Second-resolution wall-clock types.
//!
//! Every timer and timeout in this crate's spec is expressed in whole
//! seconds (the 90 s membership expiration, the 5 s/60 s DVMRP update
//! rates, ...), so unlike the teacher's own microsecond-resolution
//! `time::Instant`, a `u64` seconds counter is all that is needed here and
//! keeps the simulated-clock tests in `tests/` trivial to drive.

use core::fmt;
use core::ops::{Add, Sub};

/// A point in time, in whole seconds since an arbitrary epoch chosen by the
/// caller (typically process start, or a simulated clock in tests).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(u64);

impl Instant {
    pub const ZERO: Instant = Instant(0);

    pub fn from_secs(secs: u64) -> Instant {
        Instant(secs)
    }

    pub fn total_secs(&self) -> u64 {
        self.0
    }

    /// Saturating difference; never panics on `self < other`.
    pub fn saturating_duration_since(&self, other: Instant) -> Duration {
        Duration(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;
    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0.saturating_add(rhs.0))
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;
    fn sub(self, rhs: Instant) -> Duration {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

/// A span of time, in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub fn from_secs(secs: u64) -> Duration {
        Duration(secs)
    }

    pub fn secs(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_arithmetic() {
        let t0 = Instant::from_secs(10);
        let t1 = t0 + Duration::from_secs(5);
        assert_eq!(t1.total_secs(), 15);
        assert_eq!((t1 - t0).secs(), 5);
        assert_eq!(t0.saturating_duration_since(t1), Duration::ZERO);
    }
}
