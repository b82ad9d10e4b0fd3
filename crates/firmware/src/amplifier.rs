//! Amplifier power controller.
//!
//! Keeps the output hardware powered while anything can be heard and
//! switches it off once the prop has been quiet for a while:
//!
//! ```text
//!            enable() / activity
//!   ┌─────┐ ───────────────────► ┌────┐  quiet   ┌─────────────┐
//!   │ Off │                      │ On │ ───────► │ IdlePending │
//!   └─────┘ ◄─────────────────── └────┘ ◄─────── └─────────────┘
//!        quiet after poll + grace          activity resumed
//! ```
//!
//! "Active" means any player or generator is audible, or the last
//! `enable()` was less than `guard_ms` ago. After activity stops the task
//! waits `poll_ms`, then `grace_ms`, re-checking after each; only when both
//! checks find silence is the driver switched off and one
//! [`Notice::AmplifierOff`] emitted.

use platform::{AmpDriver, AmplifierTiming, DiagnosticSink, Notice, PowerState};
use playback::SoundSystem;
use scheduler::{Coroutine, Instant, Task};

use crate::context::Context;

/// Resume points of the controller loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    /// Powered down; watch for activity.
    Parked,
    /// Powered; watch for the end of activity.
    Watch,
    /// Poll interval elapsed.
    Settle,
    /// Grace delay elapsed.
    Grace,
}

/// Cooperative task that owns the amplifier driver.
pub struct Amplifier<A: AmpDriver> {
    driver: A,
    timing: AmplifierTiming,
    state: PowerState,
    last_enabled: Option<Instant>,
    co: Coroutine<Phase>,
    faults: u32,
}

impl<A: AmpDriver> Amplifier<A> {
    /// Controller starting in [`PowerState::Off`] with `driver` switched off.
    pub fn new(driver: A, timing: AmplifierTiming) -> Self {
        Self {
            driver,
            timing,
            state: PowerState::Off,
            last_enabled: None,
            co: Coroutine::new(Phase::Parked),
            faults: 0,
        }
    }

    /// Current power state.
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// The wrapped driver.
    pub fn driver(&self) -> &A {
        &self.driver
    }

    /// Driver calls that returned an error since construction.
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Timing this controller was built with.
    pub fn timing(&self) -> AmplifierTiming {
        self.timing
    }

    /// Power on (if needed) and restart the guard window at `now`.
    ///
    /// Idempotent. A pending power-down is abandoned.
    pub fn enable(&mut self, now: Instant, diag: &dyn DiagnosticSink) {
        self.last_enabled = Some(now);
        if self.state == PowerState::Off {
            self.power_up(diag);
        }
        self.state = PowerState::On;
        self.co.reset(Phase::Watch);
    }

    /// Whether the output must stay powered at `now`.
    ///
    /// The guard age is measured modulo 2^32, so a stale enable never reads
    /// as recent once the counter has moved half its range away.
    pub fn active(&self, now: Instant, sound: &SoundSystem) -> bool {
        if sound.audible() {
            return true;
        }
        self.last_enabled.is_some_and(|t| {
            now.as_millis().wrapping_sub(t.as_millis()) < self.timing.guard_ms
        })
    }

    /// Power down immediately.
    ///
    /// Any later activity powers the amplifier up again.
    pub fn disable(&mut self, diag: &dyn DiagnosticSink) {
        if self.state != PowerState::Off {
            self.power_down(diag);
        }
        self.last_enabled = None;
        self.co.reset(Phase::Parked);
    }

    fn power_up(&mut self, diag: &dyn DiagnosticSink) {
        if let Err(e) = self.driver.enable() {
            self.record_fault(&e);
        }
        self.state = PowerState::On;
        diag.notice(Notice::AmplifierOn);
    }

    fn power_down(&mut self, diag: &dyn DiagnosticSink) {
        if let Err(e) = self.driver.disable() {
            self.record_fault(&e);
        }
        self.state = PowerState::Off;
        diag.notice(Notice::AmplifierOff);
    }

    fn record_fault(&mut self, e: &A::Error) {
        self.faults = self.faults.saturating_add(1);
        #[cfg(feature = "defmt")]
        defmt::warn!("amplifier driver error: {}", defmt::Debug2Format(e));
        #[cfg(feature = "emulator")]
        tracing::warn!(error = ?e, "amplifier driver error");
        #[cfg(not(any(feature = "defmt", feature = "emulator")))]
        let _ = e;
    }

    fn resume_watch(&mut self) {
        self.state = PowerState::On;
        self.co.yield_at(Phase::Watch);
    }
}

impl<'a, A: AmpDriver> Task<Context<'a>> for Amplifier<A> {
    fn name(&self) -> &'static str {
        "amplifier"
    }

    /// Open the guard window at boot so the output is powered while the rest
    /// of the board comes up.
    fn setup(&mut self, cx: &mut Context<'a>) {
        if self.last_enabled.is_none() {
            self.last_enabled = Some(cx.now());
        }
    }

    fn step(&mut self, cx: &mut Context<'a>) {
        if let Some(at) = cx.amp.take() {
            self.enable(at, cx.diag);
        }
        let now = cx.now();
        let Some(phase) = self.co.resume(now) else {
            return;
        };
        let active = self.active(now, cx.sound);
        match phase {
            Phase::Parked => {
                if active {
                    self.power_up(cx.diag);
                    self.co.yield_at(Phase::Watch);
                }
            }
            Phase::Watch => {
                if !active {
                    self.state = PowerState::IdlePending;
                    self.co.sleep(now, self.timing.poll_ms, Phase::Settle);
                }
            }
            Phase::Settle => {
                if active {
                    self.resume_watch();
                } else {
                    self.co.sleep(now, self.timing.grace_ms, Phase::Grace);
                }
            }
            Phase::Grace => {
                if active {
                    self.resume_watch();
                } else {
                    self.power_down(cx.diag);
                    self.last_enabled = None;
                    self.co.yield_at(Phase::Parked);
                }
            }
        }
    }

    fn handle_command(&mut self, verb: &str, arg: &str, cx: &mut Context<'a>) -> bool {
        match (verb, arg) {
            ("amp", "on") => {
                self.enable(cx.now(), cx.diag);
                true
            }
            ("amp", "off") => {
                self.disable(cx.diag);
                true
            }
            ("whatison", _) => {
                cx.sound.report(cx.diag);
                true
            }
            _ => false,
        }
    }
}

impl<A: AmpDriver + core::fmt::Debug> core::fmt::Debug for Amplifier<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Amplifier")
            .field("driver", &self.driver)
            .field("state", &self.state)
            .field("last_enabled", &self.last_enabled)
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}
