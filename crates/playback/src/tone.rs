//! Square-wave beeper with a note queue.
//!
//! Used for menu feedback and error codes. Notes are queued from the
//! scheduler with [`ToneGenerator::beep`] and consumed by the mixer one
//! sample at a time; a frequency of 0 is a rest.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;
use platform::{AudioConfig, Block};

use crate::stream::Stream;

/// Notes that can be queued at once.
pub const TONE_QUEUE: usize = 16;

/// Peak amplitude of the square wave (about -12 dBFS).
pub const TONE_AMPLITUDE: i16 = 8_192;

/// The note queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("tone queue full")]
pub struct ToneQueueFull;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Note {
    freq_hz: u16,
    duration_ms: u32,
}

#[derive(Debug)]
struct ToneState {
    queue: Deque<Note, TONE_QUEUE>,
    /// Samples left in the current note.
    remaining: u32,
    /// Phase accumulator, one full cycle per 2^32.
    phase: u32,
    step: u32,
    freq_hz: u16,
}

impl ToneState {
    const fn new() -> Self {
        Self {
            queue: Deque::new(),
            remaining: 0,
            phase: 0,
            step: 0,
            freq_hz: 0,
        }
    }

    fn is_playing(&self) -> bool {
        self.remaining > 0 || !self.queue.is_empty()
    }

    fn start_next(&mut self, audio: &AudioConfig) -> bool {
        let Some(note) = self.queue.pop_front() else {
            return false;
        };
        self.remaining = audio.samples_for_ms(note.duration_ms);
        self.freq_hz = note.freq_hz;
        self.step = phase_step(note.freq_hz, audio.sample_rate.get());
        self.phase = 0;
        true
    }
}

#[allow(clippy::arithmetic_side_effects)] // u64 shift/div; rate >= 8000
fn phase_step(freq_hz: u16, rate_hz: u32) -> u32 {
    let step = (u64::from(freq_hz) << 32) / u64::from(rate_hz.max(1));
    u32::try_from(step).unwrap_or(u32::MAX)
}

/// Queued square-wave tone source.
pub struct ToneGenerator {
    audio: AudioConfig,
    state: Mutex<CriticalSectionRawMutex, RefCell<ToneState>>,
}

impl ToneGenerator {
    /// Silent generator.
    pub const fn new(audio: AudioConfig) -> Self {
        Self {
            audio,
            state: Mutex::new(RefCell::new(ToneState::new())),
        }
    }

    /// Queue a tone of `freq_hz` for `duration_ms`.
    pub fn beep(&self, duration_ms: u32, freq_hz: u16) -> Result<(), ToneQueueFull> {
        self.state.lock(|s| {
            s.borrow_mut()
                .queue
                .push_back(Note {
                    freq_hz,
                    duration_ms,
                })
                .map_err(|_| ToneQueueFull)
        })
    }

    /// Queue a rest.
    pub fn rest(&self, duration_ms: u32) -> Result<(), ToneQueueFull> {
        self.beep(duration_ms, 0)
    }

    /// Drop the current note and everything queued.
    pub fn stop(&self) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.queue.clear();
            s.remaining = 0;
        });
    }

    /// Notes waiting behind the current one.
    pub fn queued(&self) -> usize {
        self.state.lock(|s| s.borrow().queue.len())
    }
}

impl Stream for ToneGenerator {
    fn is_playing(&self) -> bool {
        self.state.lock(|s| s.borrow().is_playing())
    }

    fn render(&self, out: &mut Block) -> bool {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let mut produced = false;
            for o in out.iter_mut() {
                if s.remaining == 0 && !s.start_next(&self.audio) {
                    *o = 0;
                    continue;
                }
                produced = true;
                s.remaining = s.remaining.saturating_sub(1);
                *o = if s.freq_hz == 0 {
                    0
                } else if s.phase < 0x8000_0000 {
                    TONE_AMPLITUDE
                } else {
                    TONE_AMPLITUDE.saturating_neg()
                };
                s.phase = s.phase.wrapping_add(s.step);
            }
            produced
        })
    }
}

impl core::fmt::Debug for ToneGenerator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToneGenerator")
            .field("playing", &self.is_playing())
            .field("queued", &self.queued())
            .finish()
    }
}

#[allow(clippy::indexing_slicing)] // test arithmetic on small known values
#[cfg(test)]
mod tests {
    use super::*;
    use platform::SILENCE;

    #[test]
    fn idle_generator_is_silent() {
        let tone = ToneGenerator::new(AudioConfig::default());
        let mut out = [1i16; 44];
        assert!(!tone.is_playing());
        assert!(!tone.render(&mut out));
        assert_eq!(out, SILENCE);
    }

    #[test]
    fn square_wave_has_expected_period() {
        // 11025 Hz at 44.1 kHz: two samples high, two low.
        let tone = ToneGenerator::new(AudioConfig::default());
        tone.beep(10, 11_025).unwrap();
        let mut out = SILENCE;
        assert!(tone.render(&mut out));
        assert_eq!(&out[..4], &[8192, 8192, -8192, -8192]);
    }

    #[test]
    fn beep_lasts_its_duration() {
        // 2 ms = 88 samples = exactly two blocks.
        let tone = ToneGenerator::new(AudioConfig::default());
        tone.beep(2, 1_000).unwrap();
        let mut out = SILENCE;
        tone.render(&mut out);
        assert!(tone.is_playing());
        tone.render(&mut out);
        assert!(!tone.is_playing());
    }

    #[test]
    fn rest_is_playing_but_silent() {
        let tone = ToneGenerator::new(AudioConfig::default());
        tone.rest(1).unwrap();
        let mut out = [7i16; 44];
        assert!(tone.render(&mut out));
        assert_eq!(out, SILENCE);
    }

    #[test]
    fn queue_rejects_overflow_and_stop_clears() {
        let tone = ToneGenerator::new(AudioConfig::default());
        for _ in 0..TONE_QUEUE {
            tone.beep(100, 440).unwrap();
        }
        assert_eq!(tone.beep(100, 440), Err(ToneQueueFull));
        tone.stop();
        assert_eq!(tone.queued(), 0);
        assert!(!tone.is_playing());
    }
}
