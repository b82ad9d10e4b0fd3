//! Board configuration resolved once at startup.
//!
//! Hardware variation between prop boards (how many players fit in RAM, which
//! amplifier switch and which output peripheral are fitted) is described by a
//! [`BoardConfig`] value chosen from a [`BoardProfile`]. The firmware reads it
//! once during boot and instantiates the matching drivers; nothing downstream
//! branches on the board again.

use crate::audio_config::AudioConfig;

/// The application name
pub const APP_NAME: &str = "Prop Audio";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest player pool any board supports.
pub const MAX_PLAYERS: usize = 8;

/// Number of auxiliary generator lanes (tone + speech).
pub const AUX_LANES: usize = 2;

/// Known board variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardProfile {
    /// Standard board: 7 players, discrete amp on a GPIO, I2S output.
    Standard,
    /// Larger board: 8 players, codec-controlled amp, on-chip DAC output.
    Ultra,
    /// Desktop simulator: 8 players, mock amp, null/host sink.
    Host,
}

/// Which output peripheral carries the mixed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkKind {
    /// Serial audio interface (I2S) DMA.
    I2s,
    /// On-chip DAC DMA.
    Dac,
    /// Discards blocks (host builds, bring-up).
    Null,
}

/// How the amplifier is switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AmpKind {
    /// Enable/shutdown GPIO on a discrete amplifier.
    Gpio,
    /// Analog power bits of an audio codec.
    Codec,
    /// No physical amplifier (host).
    Mock,
}

/// Amplifier controller timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmplifierTiming {
    /// Time after `enable()` during which the amp counts as active even
    /// with nothing playing.
    pub guard_ms: u32,
    /// Wait after activity stops before considering power-down.
    pub poll_ms: u32,
    /// Final delay before the hardware is actually switched off.
    pub grace_ms: u32,
}

impl Default for AmplifierTiming {
    fn default() -> Self {
        Self {
            guard_ms: 30,
            poll_ms: 50,
            grace_ms: 20,
        }
    }
}

/// Errors from [`BoardConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Player count is zero or exceeds [`MAX_PLAYERS`].
    #[error("player count {0} outside 1..=8")]
    PlayerCount(usize),
    /// A timing value of zero would make the controller flap.
    #[error("amplifier timing must be non-zero")]
    ZeroTiming,
}

/// Startup configuration of the sound hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    /// Board this configuration was derived from.
    pub profile: BoardProfile,
    /// Players available in the pool.
    pub players: usize,
    /// Output peripheral.
    pub sink: SinkKind,
    /// Amplifier switch.
    pub amp: AmpKind,
    /// Output stream configuration.
    pub audio: AudioConfig,
    /// Amplifier controller timing.
    pub amp_timing: AmplifierTiming,
}

impl BoardConfig {
    /// Configuration for a known board.
    pub fn for_profile(profile: BoardProfile) -> Self {
        let (players, sink, amp) = match profile {
            BoardProfile::Standard => (7, SinkKind::I2s, AmpKind::Gpio),
            BoardProfile::Ultra => (8, SinkKind::Dac, AmpKind::Codec),
            BoardProfile::Host => (8, SinkKind::Null, AmpKind::Mock),
        };
        Self {
            profile,
            players,
            sink,
            amp,
            audio: AudioConfig::default(),
            amp_timing: AmplifierTiming::default(),
        }
    }

    /// Check invariants the sound system relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(ConfigError::PlayerCount(self.players));
        }
        let t = self.amp_timing;
        if t.guard_ms == 0 || t.poll_ms == 0 || t.grace_ms == 0 {
            return Err(ConfigError::ZeroTiming);
        }
        Ok(())
    }

    /// Mixer table length for this board: players plus auxiliary lanes.
    #[allow(clippy::arithmetic_side_effects)] // players <= MAX_PLAYERS after validate()
    pub fn lanes(&self) -> usize {
        self.players + AUX_LANES
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::for_profile(BoardProfile::Standard)
    }
}
