//! Background track player.
//!
//! Plays one clip from the built-in [`TRACKS`] library on command:
//!
//! | command            | effect                                          |
//! |--------------------|-------------------------------------------------|
//! | `play_track <n>`   | stop the current track, start track `n`         |
//! | `stop_track`       | stop immediately                                |
//! | `stop_track <ms>`  | fade out over `ms`, then stop                   |
//!
//! The task owns at most one [`Handle`]. It is dropped when the track is
//! replaced, stopped, or finishes by itself, and when the task is dropped,
//! so the player always returns to the pool.

use platform::Notice;
use playback::{Clip, EffectId, Handle, ACQUIRE_BACKOFF_MS};
use scheduler::{Coroutine, Task};

use crate::context::Context;

/// One library entry.
#[derive(Debug, Clone, Copy)]
pub struct Track {
    /// Sample data.
    pub clip: Clip,
    /// Restart at the end instead of stopping.
    pub looped: bool,
}

/// One cycle of a triangle wave spanning `N` samples with peak `amp`.
#[allow(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::cast_possible_wrap
)] // const-evaluated, i < N <= i32::MAX
const fn triangle<const N: usize>(amp: i32) -> [i16; N] {
    let mut out = [0i16; N];
    let half = N / 2;
    let mut i = 0;
    while i < N {
        let pos = if i < half { i } else { N - i };
        out[i] = ((pos as i32 * 4 * amp) / N as i32 - amp) as i16;
        i += 1;
    }
    out
}

/// 441 samples: one 100 Hz cycle at 44.1 kHz, looped.
static HUM: [i16; 441] = triangle::<441>(6_000);
/// 100 samples: 441 Hz, played for a fixed number of repeats.
const CHIME_CYCLE: [i16; 100] = triangle::<100>(9_000);
/// Roughly 0.2 s of the chime cycle.
static CHIME: [i16; 8_800] = repeat::<100, 8_800>(&CHIME_CYCLE);

#[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)] // const-evaluated, i < OUT
const fn repeat<const IN: usize, const OUT: usize>(cycle: &[i16; IN]) -> [i16; OUT] {
    let mut out = [0i16; OUT];
    let mut i = 0;
    while i < OUT {
        out[i] = cycle[i % IN];
        i += 1;
    }
    out
}

/// Built-in clip library, indexed by `play_track`.
pub static TRACKS: [Track; 2] = [
    Track {
        clip: Clip::new(EffectId(1), &HUM),
        looped: true,
    },
    Track {
        clip: Clip::new(EffectId(2), &CHIME),
        looped: false,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Idle,
    /// Waiting for a free player for `track`; `attempt` is 1-based.
    Acquire { track: usize, attempt: u32 },
}

/// Task playing library tracks on one pooled player.
#[derive(Debug)]
pub struct TrackPlayer<'s> {
    handle: Option<Handle<'s>>,
    co: Coroutine<Phase>,
}

impl<'s> TrackPlayer<'s> {
    /// Idle player holding no handle.
    pub const fn new() -> Self {
        Self {
            handle: None,
            co: Coroutine::new(Phase::Idle),
        }
    }

    /// The handle of the current track, if one is loaded.
    pub fn handle(&self) -> Option<&Handle<'s>> {
        self.handle.as_ref()
    }

    /// `true` while a track is loaded or waiting for a player.
    pub fn is_busy(&self) -> bool {
        self.handle.is_some() || self.co.marker() != Phase::Idle
    }

    fn start(&mut self, track: usize) {
        self.handle = None;
        self.co.reset(Phase::Acquire { track, attempt: 1 });
    }

    fn stop(&mut self, fade_ms: u32) {
        self.co.reset(Phase::Idle);
        if fade_ms == 0 {
            if let Some(h) = self.handle.take() {
                h.stop();
            }
        } else if let Some(h) = &self.handle {
            h.fade_out(fade_ms);
        }
    }
}

impl Default for TrackPlayer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> Task<Context<'s>> for TrackPlayer<'s> {
    fn name(&self) -> &'static str {
        "track_player"
    }

    fn step(&mut self, cx: &mut Context<'s>) {
        // Finished or reclaimed: give the player back.
        if self.handle.as_ref().is_some_and(|h| !h.is_playing()) {
            self.handle = None;
        }

        let now = cx.now();
        let Some(Phase::Acquire { track, attempt }) = self.co.resume(now) else {
            return;
        };
        let Some(entry) = TRACKS.get(track) else {
            self.co.yield_at(Phase::Idle);
            return;
        };
        if let Some(h) = cx.sound.acquire_free() {
            cx.amp.request(now);
            if entry.looped {
                h.play_looped(entry.clip);
            } else {
                h.play(entry.clip);
            }
            self.handle = Some(h);
            self.co.yield_at(Phase::Idle);
        } else {
            cx.diag.notice(Notice::PoolExhausted { attempt });
            self.co.sleep(
                now,
                ACQUIRE_BACKOFF_MS,
                Phase::Acquire {
                    track,
                    attempt: attempt.saturating_add(1),
                },
            );
        }
    }

    fn handle_command(&mut self, verb: &str, arg: &str, _cx: &mut Context<'s>) -> bool {
        match verb {
            "play_track" => match arg.parse::<usize>() {
                Ok(n) if n < TRACKS.len() => {
                    self.start(n);
                    true
                }
                _ => false,
            },
            "stop_track" => {
                let fade_ms = arg.parse::<u32>().unwrap_or(0);
                self.stop(fade_ms);
                true
            }
            _ => false,
        }
    }
}
