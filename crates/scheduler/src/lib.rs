//! Cooperative scheduler for the prop firmware.
//!
//! Many long-running jobs (amplifier power management, track playback,
//! blinkers, sensors) share the single thread-mode context. Each job is a
//! [`Task`] whose `step` runs until its next suspension point and returns;
//! the [`Scheduler`] calls every step in turn, forever.
//!
//! # Building blocks
//!
//! - [`Instant`] - wrapping millisecond counter with signed-difference
//!   deadline checks
//! - [`Clock`] - time source ([`ManualClock`] for tests, `SystemClock` on
//!   hardware with the `embassy` feature)
//! - [`Coroutine`] - resume marker + wake deadline that turns a task's
//!   resume-point enum into a sleeping/yielding state machine
//! - [`Scheduler`] - immutable, fixed-capacity registry with round-robin
//!   stepping and command dispatch
//!
//! Nothing here allocates.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod clock;
pub mod coroutine;
pub mod registry;
pub mod task;
pub mod time;

#[cfg(feature = "embassy")]
pub use clock::SystemClock;
pub use clock::{Clock, ManualClock};
pub use coroutine::{Coroutine, Progress};
pub use registry::{RegistryError, Scheduler, SchedulerBuilder};
pub use task::Task;
pub use time::{Instant, MAX_SPAN_MS};
