//! LPC speech synthesizer.
//!
//! Speech is stored as a sequence of [`Frame`]s in the style of the classic
//! TMS5220 speak-and-spell chips: every 25 ms frame carries an excitation
//! energy, a pitch period (0 for unvoiced sounds) and ten reflection
//! coefficients for an all-pole lattice filter.
//!
//! ```text
//!  excitation ──► u10 ─(-k10·x9)─► u9 ─ … ─(-k1·x0)─► u0 ──► out
//!                        x9 ◄─(+k9·u8)─ … ─ x1 ◄─(+k1·u0)─ x0 ◄─┘
//! ```
//!
//! The lattice runs at 8 kHz; each output-rate sample holds the most recent
//! 8 kHz value (zero-order hold).

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;
use platform::{AudioConfig, Block};

use crate::mixer::saturate;
use crate::stream::Stream;

/// Lattice filter order.
pub const POLES: usize = 10;

/// Native synthesis rate.
pub const SYNTH_RATE_HZ: u32 = 8_000;

/// 8 kHz samples per frame (25 ms).
pub const FRAME_SAMPLES: u32 = 200;

/// Phrases that can wait behind the current one.
pub const PHRASE_QUEUE: usize = 4;

/// One 25 ms LPC frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Excitation amplitude; 0 is silence.
    pub energy: u16,
    /// Pitch period in 8 kHz samples; 0 selects noise excitation.
    pub pitch: u8,
    /// Reflection coefficients k1..k10 in Q1.14.
    pub k: [i16; POLES],
}

impl Frame {
    /// A silent frame (pause between words).
    pub const SILENT: Self = Self {
        energy: 0,
        pitch: 0,
        k: [0; POLES],
    };
}

/// The phrase queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("speech queue full")]
pub struct SpeechQueueFull;

#[derive(Debug)]
struct SpeechState {
    queue: Deque<&'static [Frame], PHRASE_QUEUE>,
    phrase: &'static [Frame],
    frame: usize,
    frame_pos: u32,
    x: [i32; POLES],
    pitch_count: u8,
    lfsr: u16,
    resample_acc: u32,
    held: i16,
}

impl SpeechState {
    const fn new() -> Self {
        Self {
            queue: Deque::new(),
            phrase: &[],
            frame: 0,
            frame_pos: 0,
            x: [0; POLES],
            pitch_count: 0,
            lfsr: 1,
            resample_acc: 0,
            held: 0,
        }
    }

    fn current(&self) -> Option<&'static Frame> {
        self.phrase.get(self.frame)
    }

    fn is_playing(&self) -> bool {
        self.current().is_some() || !self.queue.is_empty()
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.phrase = &[];
        self.frame = 0;
        self.frame_pos = 0;
        self.x = [0; POLES];
        self.held = 0;
    }

    /// Current frame, moving on to the next queued phrase if needed.
    fn frame_or_next(&mut self) -> Option<Frame> {
        if let Some(f) = self.current() {
            return Some(*f);
        }
        let next = self.queue.pop_front()?;
        self.phrase = next;
        self.frame = 0;
        self.frame_pos = 0;
        self.x = [0; POLES];
        self.current().copied()
    }

    /// Next 8 kHz sample, or `None` when everything has been spoken.
    fn next_sample(&mut self) -> Option<i16> {
        let frame = self.frame_or_next()?;
        let excitation = self.excitation(&frame);
        let out = lattice(&mut self.x, &frame.k, excitation);
        self.frame_pos = self.frame_pos.saturating_add(1);
        if self.frame_pos >= FRAME_SAMPLES {
            self.frame_pos = 0;
            self.frame = self.frame.saturating_add(1);
        }
        Some(out)
    }

    #[allow(clippy::arithmetic_side_effects)] // single-bit LFSR shift
    fn excitation(&mut self, frame: &Frame) -> i32 {
        let energy = i32::from(frame.energy);
        if frame.pitch == 0 {
            // 16-bit Galois LFSR, taps 16 14 13 11.
            let bit = self.lfsr & 1;
            self.lfsr >>= 1;
            if bit != 0 {
                self.lfsr ^= 0xB400;
            }
            if bit != 0 {
                energy
            } else {
                energy.saturating_neg()
            }
        } else {
            let pulse = self.pitch_count == 0;
            self.pitch_count = self.pitch_count.saturating_add(1);
            if self.pitch_count >= frame.pitch {
                self.pitch_count = 0;
            }
            if pulse {
                energy.saturating_mul(4)
            } else {
                0
            }
        }
    }
}

#[inline]
#[allow(clippy::arithmetic_side_effects)] // |k| <= 2^15, |v| <= 2^15: product fits i32
fn mul_q14(k: i16, v: i32) -> i32 {
    (i32::from(k) * v.clamp(-32_768, 32_767)) >> 14
}

/// One step of the all-pole lattice. Returns the output sample.
#[allow(clippy::indexing_slicing)] // all indices < POLES + 1 by loop bounds
#[allow(clippy::arithmetic_side_effects)] // i + 1 <= POLES, i - 1 >= 0 by loop bounds
fn lattice(x: &mut [i32; POLES], k: &[i16; POLES], excitation: i32) -> i16 {
    let mut u = [0i32; POLES + 1];
    u[POLES] = excitation;
    for i in (0..POLES).rev() {
        u[i] = u[i + 1]
            .saturating_sub(mul_q14(k[i], x[i]))
            .clamp(-32_768, 32_767);
    }
    for i in (1..POLES).rev() {
        x[i] = x[i - 1]
            .saturating_add(mul_q14(k[i - 1], u[i - 1]))
            .clamp(-32_768, 32_767);
    }
    x[0] = u[0];
    saturate(u[0])
}

/// Queued LPC speech source.
pub struct SpeechSynth {
    audio: AudioConfig,
    state: Mutex<CriticalSectionRawMutex, RefCell<SpeechState>>,
}

impl SpeechSynth {
    /// Silent synthesizer.
    pub const fn new(audio: AudioConfig) -> Self {
        Self {
            audio,
            state: Mutex::new(RefCell::new(SpeechState::new())),
        }
    }

    /// Queue a phrase for speaking after anything already queued.
    pub fn say(&self, phrase: &'static [Frame]) -> Result<(), SpeechQueueFull> {
        self.state
            .lock(|s| s.borrow_mut().queue.push_back(phrase).map_err(|_| SpeechQueueFull))
    }

    /// Stop speaking and drop queued phrases.
    pub fn stop(&self) {
        self.state.lock(|s| s.borrow_mut().clear());
    }
}

impl Stream for SpeechSynth {
    fn is_playing(&self) -> bool {
        self.state.lock(|s| s.borrow().is_playing())
    }

    fn render(&self, out: &mut Block) -> bool {
        let rate = self.audio.sample_rate.get();
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if !s.is_playing() {
                out.fill(0);
                return false;
            }
            for o in out.iter_mut() {
                // rate >= SYNTH_RATE_HZ, so at most one new 8 kHz sample per
                // output sample.
                s.resample_acc = s.resample_acc.saturating_add(SYNTH_RATE_HZ);
                if s.resample_acc >= rate {
                    s.resample_acc = s.resample_acc.saturating_sub(rate);
                    s.held = s.next_sample().unwrap_or(0);
                }
                *o = s.held;
            }
            true
        })
    }
}

impl core::fmt::Debug for SpeechSynth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpeechSynth")
            .field("playing", &self.is_playing())
            .finish()
    }
}
