//! Resumable task state.
//!
//! A task step is an ordinary function that returns promptly. Code that in a
//! threaded system would block ("wait 50 ms, then check again") is written as
//! a `match` over a resume-point enum owned by the task; the [`Coroutine`]
//! record stores which arm to run next and, when sleeping, the wake deadline.
//! Locals that must survive a suspension are promoted to task fields.
//!
//! ```
//! use scheduler::{Coroutine, Instant};
//!
//! #[derive(Clone, Copy, PartialEq, Eq, Debug)]
//! enum Blink { On, Off }
//!
//! let mut co = Coroutine::new(Blink::On);
//! let mut toggles = 0;
//! let mut now = Instant::ZERO;
//! for _ in 0..4 {
//!     match co.resume(now) {
//!         Some(Blink::On) => { toggles += 1; co.sleep(now, 10, Blink::Off) }
//!         Some(Blink::Off) => { toggles += 1; co.sleep(now, 10, Blink::On) }
//!         None => {}
//!     }
//!     now = now.wrapping_add_ms(5);
//! }
//! assert_eq!(toggles, 2);
//! ```
//!
//! Nesting works the same way: a parent keeps the child's state machine as a
//! field, and its own resume point for "running the child" re-enters the
//! child's step until that reports [`Progress::Done`]. No frame is ever
//! allocated.

use crate::time::{Instant, MAX_SPAN_MS};

/// Outcome of driving a nested routine one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress<T = ()> {
    /// The routine suspended; call again on a later pass.
    Pending,
    /// The routine finished with a value.
    Done(T),
}

impl<T> Progress<T> {
    /// `true` for [`Progress::Done`].
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Resume marker plus optional wake deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coroutine<P> {
    marker: P,
    wake: Option<Instant>,
}

impl<P: Copy> Coroutine<P> {
    /// Fresh record that will run `start` on the first resume.
    pub const fn new(start: P) -> Self {
        Self {
            marker: start,
            wake: None,
        }
    }

    /// The resume point to run now, or `None` while a sleep is pending.
    ///
    /// Clears the deadline once it has been reached.
    pub fn resume(&mut self, now: Instant) -> Option<P> {
        if let Some(deadline) = self.wake {
            if !deadline.is_reached(now) {
                return None;
            }
            self.wake = None;
        }
        Some(self.marker)
    }

    /// Suspend until the next pass, continuing at `marker`.
    pub fn yield_at(&mut self, marker: P) {
        self.marker = marker;
        self.wake = None;
    }

    /// Suspend for `ms` milliseconds, continuing at `marker`.
    ///
    /// Durations beyond [`MAX_SPAN_MS`] are clamped.
    pub fn sleep(&mut self, now: Instant, ms: u32, marker: P) {
        self.sleep_until(now.wrapping_add_ms(ms.min(MAX_SPAN_MS)), marker);
    }

    /// Suspend until `deadline`, continuing at `marker`.
    pub fn sleep_until(&mut self, deadline: Instant, marker: P) {
        self.marker = marker;
        self.wake = Some(deadline);
    }

    /// Abandon any pending sleep and restart at `marker`.
    pub fn reset(&mut self, marker: P) {
        self.yield_at(marker);
    }

    /// Resume point stored for the next run.
    pub fn marker(&self) -> P {
        self.marker
    }

    /// Pending wake deadline, if sleeping.
    pub fn wake_at(&self) -> Option<Instant> {
        self.wake
    }

    /// `true` if a sleep is pending and has not yet expired at `now`.
    pub fn is_sleeping(&self, now: Instant) -> bool {
        self.wake.is_some_and(|d| !d.is_reached(now))
    }
}

impl<P: Copy + Default> Default for Coroutine<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

#[allow(clippy::arithmetic_side_effects)] // test arithmetic on small known values
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Point {
        A,
        B,
    }

    #[test]
    fn starts_at_initial_marker() {
        let mut co = Coroutine::new(Point::A);
        assert_eq!(co.resume(Instant::ZERO), Some(Point::A));
    }

    #[test]
    fn yield_resumes_next_pass() {
        let mut co = Coroutine::new(Point::A);
        co.yield_at(Point::B);
        assert_eq!(co.resume(Instant::ZERO), Some(Point::B));
        assert_eq!(co.wake_at(), None);
    }

    #[test]
    fn sleep_blocks_until_deadline() {
        let mut co = Coroutine::new(Point::A);
        let t0 = Instant::from_millis(100);
        co.sleep(t0, 50, Point::B);
        assert!(co.is_sleeping(t0));
        assert_eq!(co.resume(Instant::from_millis(149)), None);
        assert_eq!(co.resume(Instant::from_millis(150)), Some(Point::B));
        // Deadline consumed: later resumes don't wait again.
        assert_eq!(co.wake_at(), None);
        assert_eq!(co.resume(Instant::from_millis(150)), Some(Point::B));
    }

    #[test]
    fn sleep_across_counter_wrap() {
        let mut co = Coroutine::new(Point::A);
        let t0 = Instant::from_millis(u32::MAX - 4);
        co.sleep(t0, 10, Point::B);
        assert_eq!(co.resume(Instant::from_millis(2)), None);
        assert_eq!(co.resume(Instant::from_millis(5)), Some(Point::B));
    }

    #[test]
    fn reset_cancels_sleep() {
        let mut co = Coroutine::new(Point::A);
        co.sleep(Instant::ZERO, 1_000, Point::B);
        co.reset(Point::A);
        assert_eq!(co.resume(Instant::ZERO), Some(Point::A));
    }

    #[test]
    fn huge_sleep_is_clamped() {
        let mut co = Coroutine::new(Point::A);
        co.sleep(Instant::ZERO, u32::MAX, Point::B);
        assert_eq!(co.wake_at(), Some(Instant::from_millis(MAX_SPAN_MS)));
        assert!(co.is_sleeping(Instant::from_millis(1)));
    }
}
