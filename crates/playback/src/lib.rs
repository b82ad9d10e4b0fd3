//! Sound core: player pool, shared handles, real-time mixer and generators.
//!
//! ```text
//! scheduler tasks ──acquire/play/drop──► Pool ──bind/unbind──► Mixer lanes
//!                                                                 │
//! real-time interrupt ──tick()──► Mixer ──render()──► Player / Tone / Speech
//! ```
//!
//! Nothing here allocates, and the real-time path has no error returns.
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod handle;
pub mod mixer;
pub mod player;
pub mod pool;
pub mod speech;
pub mod stream;
pub mod system;
pub mod tone;

pub use handle::Handle;
pub use mixer::{Lane, LaneOutOfRange, Mixer};
pub use player::{Player, PlayerSnapshot};
pub use pool::{Pool, ACQUIRE_BACKOFF_MS};
pub use speech::{Frame, SpeechQueueFull, SpeechSynth};
pub use stream::{Clip, EffectId, SourceBank, SourceId, Stream};
pub use system::{SoundSystem, MAX_LANES, SPEECH_LANE, TONE_LANE};
pub use tone::{ToneGenerator, ToneQueueFull};
