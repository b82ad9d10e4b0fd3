//! One pool slot: a clip player with a reference count.
//!
//! The count and generation are plain atomics touched only from the
//! scheduler. Playback state (clip, position, gain, fade) is shared with the
//! mixer interrupt and lives behind a critical-section mutex; every access is
//! a short copy-in/copy-out of a `Copy` struct, so the interrupt is masked
//! for at most one block render.

use core::cell::Cell;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use platform::{AudioConfig, Block, Gain, VolumePercent};

use crate::mixer::saturate;
use crate::stream::{Clip, Stream};

#[derive(Debug, Clone, Copy)]
struct Playback {
    clip: Option<Clip>,
    pos: usize,
    looping: bool,
    gain: Gain,
    /// Gain decrement per block while fading out; 0 when not fading.
    fade_step: u16,
}

impl Playback {
    const IDLE: Self = Self {
        clip: None,
        pos: 0,
        looping: false,
        gain: Gain::UNITY,
        fade_step: 0,
    };

    fn stop(&mut self) {
        self.clip = None;
        self.pos = 0;
        self.fade_step = 0;
    }

    fn fill(&mut self, out: &mut Block) -> bool {
        let Some(clip) = self.clip else {
            out.fill(0);
            return false;
        };
        let len = clip.pcm.len();
        let gain = self.gain;
        for o in out.iter_mut() {
            if self.pos >= len && self.looping {
                self.pos = 0;
            }
            *o = match clip.pcm.get(self.pos) {
                Some(&s) => {
                    self.pos = self.pos.saturating_add(1);
                    saturate(gain.apply(i32::from(s)))
                }
                None => 0,
            };
        }
        if self.pos >= len && !self.looping {
            self.stop();
        }
        if self.fade_step > 0 {
            self.gain = Gain::from_raw(self.gain.raw().saturating_sub(self.fade_step));
            if self.gain == Gain::MUTE {
                self.stop();
            }
        }
        true
    }
}

/// Point-in-time view of a player, for status dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Clip is loaded and not finished.
    pub playing: bool,
    /// Current volume.
    pub volume: VolumePercent,
    /// Outstanding handles.
    pub refs: u8,
    /// Fade step per block, 0 when not fading.
    pub fade_speed: u16,
}

/// A playback unit in the pool.
pub struct Player {
    refs: AtomicU8,
    generation: AtomicU8,
    audio: AudioConfig,
    state: Mutex<CriticalSectionRawMutex, Cell<Playback>>,
}

impl Player {
    /// Idle, unreferenced player.
    pub const fn new(audio: AudioConfig) -> Self {
        Self {
            refs: AtomicU8::new(0),
            generation: AtomicU8::new(0),
            audio,
            state: Mutex::new(Cell::new(Playback::IDLE)),
        }
    }

    /// Outstanding handle count.
    pub fn refs(&self) -> u8 {
        self.refs.load(Ordering::Acquire)
    }

    /// `true` when no handle refers to this player.
    pub fn is_available(&self) -> bool {
        self.refs() == 0
    }

    /// Clip currently loaded.
    pub fn clip(&self) -> Option<Clip> {
        self.read(|p| p.clip)
    }

    /// Current volume.
    pub fn volume(&self) -> VolumePercent {
        self.read(|p| p.gain.to_volume())
    }

    /// Fade step per block (0 = not fading).
    pub fn fade_speed(&self) -> u16 {
        self.read(|p| p.fade_step)
    }

    /// Status line data.
    pub fn snapshot(&self) -> PlayerSnapshot {
        let p = self.read(|p| *p);
        PlayerSnapshot {
            playing: p.clip.is_some(),
            volume: p.gain.to_volume(),
            refs: self.refs(),
            fade_speed: p.fade_step,
        }
    }

    // ── pool / handle internals ─────────────────────────────────────────────

    pub(crate) fn generation(&self) -> u8 {
        self.generation.load(Ordering::Acquire)
    }

    /// Claim a free player: refs 0 → 1.
    pub(crate) fn try_claim(&self) -> bool {
        self.refs
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Add a reference to a player that already has at least one.
    pub(crate) fn try_retain(&self) -> bool {
        self.refs
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
                if r == 0 {
                    None
                } else {
                    r.checked_add(1)
                }
            })
            .is_ok()
    }

    /// Drop one reference. Returns the count before the decrement.
    pub(crate) fn release(&self) -> u8 {
        self.refs
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| r.checked_sub(1))
            .unwrap_or(0)
    }

    /// Forget every reference and invalidate outstanding handles.
    pub(crate) fn force_reclaim(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.refs.store(0, Ordering::Release);
        self.reset();
    }

    /// Stop playback and restore full volume.
    pub(crate) fn reset(&self) {
        self.state.lock(|c| c.set(Playback::IDLE));
    }

    pub(crate) fn play(&self, clip: Clip, looping: bool) {
        self.modify(|p| {
            p.stop();
            if !clip.pcm.is_empty() {
                p.clip = Some(clip);
                p.looping = looping;
            }
        });
    }

    pub(crate) fn set_looping(&self, looping: bool) {
        self.modify(|p| p.looping = looping);
    }

    pub(crate) fn stop(&self) {
        self.modify(Playback::stop);
    }

    pub(crate) fn set_volume(&self, volume: VolumePercent) {
        self.modify(|p| {
            p.gain = Gain::from_volume(volume);
            p.fade_step = 0;
        });
    }

    /// Ramp to silence over `ms`, then stop.
    pub(crate) fn fade_out(&self, ms: u32) {
        let blocks = self.audio.ticks_for_ms(ms).max(1);
        self.modify(|p| {
            if p.clip.is_none() {
                return;
            }
            if p.gain == Gain::MUTE {
                p.stop();
                return;
            }
            let step = u32::from(p.gain.raw()).div_ceil(blocks).max(1);
            p.fade_step = u16::try_from(step).unwrap_or(u16::MAX);
        });
    }

    fn read<T>(&self, f: impl FnOnce(&Playback) -> T) -> T {
        self.state.lock(|c| f(&c.get()))
    }

    fn modify(&self, f: impl FnOnce(&mut Playback)) {
        self.state.lock(|c| {
            let mut p = c.get();
            f(&mut p);
            c.set(p);
        });
    }
}

impl Stream for Player {
    fn is_playing(&self) -> bool {
        self.read(|p| p.clip.is_some())
    }

    fn render(&self, out: &mut Block) -> bool {
        self.state.lock(|c| {
            let mut p = c.get();
            let produced = p.fill(out);
            c.set(p);
            produced
        })
    }
}

impl core::fmt::Debug for Player {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = self.snapshot();
        f.debug_struct("Player")
            .field("refs", &s.refs)
            .field("generation", &self.generation())
            .field("playing", &s.playing)
            .field("volume", &s.volume)
            .finish()
    }
}
