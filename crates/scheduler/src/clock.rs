//! Millisecond time sources.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::time::Instant;

/// Monotonic millisecond counter that wraps at `u32::MAX`.
pub trait Clock {
    /// Current counter value.
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock driven by hand. Used by tests and the host simulator.
///
/// Interior-mutable so the same clock can be shared by the scheduler context
/// and the code advancing it.
#[derive(Debug, Default)]
pub struct ManualClock {
    ms: AtomicU32,
}

impl ManualClock {
    /// Start at counter value `start`.
    pub const fn new(start: u32) -> Self {
        Self {
            ms: AtomicU32::new(start),
        }
    }

    /// Move the counter forward by `ms`, wrapping.
    pub fn advance(&self, ms: u32) {
        // fetch_add wraps on overflow, matching the hardware counter.
        self.ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Jump to an absolute counter value.
    pub fn set(&self, at: Instant) {
        self.ms.store(at.as_millis(), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.ms.load(Ordering::Relaxed))
    }
}

/// Clock backed by the embassy time driver.
///
/// The 64-bit embassy tick count is truncated to 32 bits of milliseconds so
/// every consumer sees the same wrapping counter.
#[cfg(feature = "embassy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "embassy")]
impl Clock for SystemClock {
    #[allow(clippy::cast_possible_truncation)] // wrap at 2^32 ms is intended
    fn now(&self) -> Instant {
        Instant::from_millis(embassy_time::Instant::now().as_millis() as u32)
    }
}

#[allow(clippy::arithmetic_side_effects)] // test arithmetic on small known values
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_and_wraps() {
        let clock = ManualClock::new(u32::MAX - 1);
        clock.advance(3);
        assert_eq!(clock.now(), Instant::from_millis(1));
    }

    #[test]
    fn manual_clock_set_jumps() {
        let clock = ManualClock::default();
        clock.set(Instant::from_millis(500));
        assert_eq!((&clock).now().as_millis(), 500);
    }
}
