//! The sound subsystem as one context object.
//!
//! [`SoundSystem`] owns the player pool, the mixer and the two generators.
//! It is built once at boot (usually into a `StaticCell`) and shared by
//! reference: tasks use the pool/generator API, the real-time interrupt calls
//! [`SoundSystem::tick_into`].
//!
//! Source table layout:
//!
//! | lanes                | source                     |
//! |----------------------|----------------------------|
//! | `0..MAX_PLAYERS`     | pool player `i`            |
//! | `TONE_LANE`          | [`ToneGenerator`]          |
//! | `SPEECH_LANE`        | [`SpeechSynth`]            |

use embedded_hal::delay::DelayNs;
use platform::config::{AUX_LANES, MAX_PLAYERS};
use platform::{AudioConfig, Block, BoardConfig, DiagnosticSink, Gain, Notice};

use crate::handle::Handle;
use crate::mixer::Mixer;
use crate::pool::Pool;
use crate::speech::SpeechSynth;
use crate::stream::{Clip, SourceBank, SourceId, Stream};
use crate::tone::ToneGenerator;

/// Lanes in the source table.
pub const MAX_LANES: usize = MAX_PLAYERS + AUX_LANES;

/// Lane (and source id) of the tone generator.
#[allow(clippy::cast_possible_truncation)] // MAX_PLAYERS = 8
pub const TONE_LANE: u8 = MAX_PLAYERS as u8;

/// Lane (and source id) of the speech synthesizer.
#[allow(clippy::cast_possible_truncation)]
pub const SPEECH_LANE: u8 = MAX_PLAYERS as u8 + 1;

/// Pool, mixer and generators.
#[derive(Debug)]
pub struct SoundSystem {
    audio: AudioConfig,
    pool: Pool<MAX_PLAYERS>,
    mixer: Mixer<MAX_LANES>,
    tone: ToneGenerator,
    speech: SpeechSynth,
}

impl SoundSystem {
    /// Build for `board`: its player count and output configuration.
    ///
    /// Generators are not yet mixed; call [`reinitialize`](Self::reinitialize)
    /// once before starting the real-time tick.
    pub fn new(board: &BoardConfig) -> Self {
        let audio = board.audio;
        Self {
            audio,
            pool: Pool::with_capacity(audio, board.players),
            mixer: Mixer::new(),
            tone: ToneGenerator::new(audio),
            speech: SpeechSynth::new(audio),
        }
    }

    /// Output configuration.
    pub fn audio(&self) -> AudioConfig {
        self.audio
    }

    /// Player pool.
    pub fn pool(&self) -> &Pool<MAX_PLAYERS> {
        &self.pool
    }

    /// Mixer and source table.
    pub fn mixer(&self) -> &Mixer<MAX_LANES> {
        &self.mixer
    }

    /// Beeper.
    pub fn tone(&self) -> &ToneGenerator {
        &self.tone
    }

    /// Speech synthesizer.
    pub fn speech(&self) -> &SpeechSynth {
        &self.speech
    }

    /// See [`Pool::acquire_free`].
    pub fn acquire_free(&self) -> Option<Handle<'_>> {
        self.pool.acquire_free(&self.mixer)
    }

    /// See [`Pool::acquire_blocking`].
    pub fn acquire_blocking(
        &self,
        delay: &mut impl DelayNs,
        diag: &(impl DiagnosticSink + ?Sized),
    ) -> Handle<'_> {
        self.pool.acquire_blocking(&self.mixer, delay, diag)
    }

    /// See [`Pool::find_by_stream`].
    pub fn find_by_stream(&self, pred: impl Fn(&Clip) -> bool) -> Option<Handle<'_>> {
        self.pool.find_by_stream(&self.mixer, pred)
    }

    /// Players with a clip loaded.
    pub fn playing_count(&self) -> usize {
        self.pool.playing_count()
    }

    /// Any player or generator has something to play.
    pub fn any_active(&self) -> bool {
        self.playing_count() > 0 || self.tone.is_playing() || self.speech.is_playing()
    }

    /// [`any_active`](Self::any_active) and not muted by the master volume.
    pub fn audible(&self) -> bool {
        self.mixer.master_gain() != Gain::MUTE && self.any_active()
    }

    /// Return the subsystem to its boot state.
    ///
    /// Empties the source table first so the interrupt stops reading any
    /// player, then force-reclaims players that are still referenced (one
    /// [`Notice::StaleReference`] each; their old handles go inert), resets
    /// every volume and finally re-binds the generator lanes.
    pub fn reinitialize(&self, diag: &(impl DiagnosticSink + ?Sized)) {
        self.mixer.unbind_all();
        self.pool.reclaim_all(diag);
        self.tone.stop();
        self.speech.stop();
        for lane in [TONE_LANE, SPEECH_LANE] {
            if let Some(slot) = self.mixer.lane(usize::from(lane)) {
                slot.set(SourceId::new(lane));
            }
        }
    }

    /// Mix one block. Real-time context only.
    pub fn tick(&self) -> Block {
        self.mixer.tick(self)
    }

    /// Mix one block into `out`. Real-time context only.
    pub fn tick_into(&self, out: &mut Block) {
        self.mixer.tick_into(self, out);
    }

    /// One status line per source: tone, speech, then every player.
    pub fn report(&self, diag: &(impl DiagnosticSink + ?Sized)) {
        diag.notice(Notice::SourceStatus {
            kind: "tone",
            index: 0,
            playing: self.tone.is_playing(),
            volume: 100,
            refs: 0,
            fade_speed: 0,
        });
        diag.notice(Notice::SourceStatus {
            kind: "speech",
            index: 0,
            playing: self.speech.is_playing(),
            volume: 100,
            refs: 0,
            fade_speed: 0,
        });
        for (i, player) in self.pool.players().enumerate() {
            let s = player.snapshot();
            diag.notice(Notice::SourceStatus {
                kind: "player",
                index: u8::try_from(i).unwrap_or(u8::MAX),
                playing: s.playing,
                volume: s.volume.get(),
                refs: s.refs,
                fade_speed: s.fade_speed,
            });
        }
    }
}

impl SourceBank for SoundSystem {
    fn source(&self, id: SourceId) -> Option<&dyn Stream> {
        match id.index() {
            TONE_LANE => Some(&self.tone),
            SPEECH_LANE => Some(&self.speech),
            i => self
                .pool
                .player(usize::from(i))
                .map(|p| p as &dyn Stream),
        }
    }
}
