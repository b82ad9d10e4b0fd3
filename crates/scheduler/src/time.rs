//! Wrap-safe millisecond time.
//!
//! The time base is a free-running `u32` millisecond counter that wraps every
//! ~49.7 days. Absolute comparisons (`a < b`) break at the wrap, so every
//! deadline check goes through the signed difference of the two counters:
//!
//! ```text
//! reached(now, deadline)  <=>  (now - deadline) as i32 >= 0
//! ```
//!
//! This is correct as long as the distance between the two instants is less
//! than half the counter range (~24.8 days). Sleeps longer than that are not
//! supported.

/// Longest duration the wrap-safe comparison can represent, in milliseconds.
pub const MAX_SPAN_MS: u32 = 0x7FFF_FFFF;

/// A point on the wrapping millisecond counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Instant(u32);

impl Instant {
    /// Counter value zero.
    pub const ZERO: Self = Self(0);

    /// Wrap an absolute counter value.
    #[must_use]
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// The instant `ms` milliseconds after `self`, wrapping at the counter width.
    #[must_use]
    pub const fn wrapping_add_ms(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }

    /// Signed distance `self - earlier` in milliseconds.
    ///
    /// Positive when `self` is after `earlier`, negative when before.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // reinterpreting the wrapped difference is the point
    pub const fn signed_since(self, earlier: Self) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }

    /// Milliseconds elapsed from `earlier` to `self`, or 0 if `earlier` is
    /// actually in the future.
    #[must_use]
    #[allow(clippy::cast_sign_loss)] // guarded by the max(0)
    pub const fn saturating_since(self, earlier: Self) -> u32 {
        let d = self.signed_since(earlier);
        if d < 0 {
            0
        } else {
            d as u32
        }
    }

    /// `true` once `now` is at or past `self`.
    #[must_use]
    pub const fn is_reached(self, now: Self) -> bool {
        now.signed_since(self) >= 0
    }
}
