//! Application context handed to every task step.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use platform::DiagnosticSink;
use playback::SoundSystem;
use scheduler::{Clock, Instant};

/// Power-up request left for the amplifier task by other tasks.
///
/// Tasks that start sound call [`AmpLatch::request`]; the amplifier task
/// collects it at the start of its next step and treats it exactly like an
/// explicit `enable()` at the recorded time.
#[derive(Debug, Default)]
pub struct AmpLatch {
    pending: AtomicBool,
    at: AtomicU32,
}

impl AmpLatch {
    /// No request pending.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            at: AtomicU32::new(0),
        }
    }

    /// Ask for the amplifier to be powered, stamped `now`.
    ///
    /// Repeated requests before the amplifier task runs collapse into the
    /// latest one.
    pub fn request(&self, now: Instant) {
        self.at.store(now.as_millis(), Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
    }

    /// Take the pending request, if any.
    pub fn take(&self) -> Option<Instant> {
        if self.pending.swap(false, Ordering::Acquire) {
            Some(Instant::from_millis(self.at.load(Ordering::Relaxed)))
        } else {
            None
        }
    }

    /// `true` while a request waits to be taken.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Everything a task may touch: time, sound, diagnostics, amplifier requests.
///
/// Built once by the entry point; every field is a shared reference so the
/// mixer interrupt can hold the same [`SoundSystem`] concurrently.
pub struct Context<'a> {
    /// Millisecond time base.
    pub clock: &'a dyn Clock,
    /// Player pool, mixer and generators.
    pub sound: &'a SoundSystem,
    /// Destination for single-line notices.
    pub diag: &'a dyn DiagnosticSink,
    /// Amplifier power-up requests.
    pub amp: &'a AmpLatch,
}

impl<'a> Context<'a> {
    /// Bundle the shared collaborators.
    pub fn new(
        clock: &'a dyn Clock,
        sound: &'a SoundSystem,
        diag: &'a dyn DiagnosticSink,
        amp: &'a AmpLatch,
    ) -> Self {
        Self {
            clock,
            sound,
            diag,
            amp,
        }
    }

    /// Current clock value.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }
}

impl core::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("now", &self.now())
            .field("sound", &self.sound)
            .field("amp", &self.amp)
            .finish_non_exhaustive()
    }
}
