//! Diagnostic notices emitted by the sound core.
//!
//! The core never formats text itself. It hands a typed [`Notice`] to a
//! [`DiagnosticSink`]; where the line ends up (RTT via `defmt`, a host
//! terminal via `tracing`, nowhere) is decided by the sink.
//!
//! Every notice renders as exactly one line through [`core::fmt::Display`].

use core::fmt;

/// Severity attached to a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Normal state transitions.
    Info,
    /// Recoverable misuse or resource pressure.
    Warn,
}

/// One single-line diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    /// `acquire_blocking` found no free player and will retry after backoff.
    PoolExhausted {
        /// 1-based retry counter.
        attempt: u32,
    },
    /// A slot was still referenced when the pool was reinitialized and has
    /// been forcibly reclaimed.
    StaleReference {
        /// Slot index.
        slot: u8,
        /// Reference count found on the slot.
        refs: u8,
    },
    /// The amplifier controller powered the output hardware down.
    AmplifierOff,
    /// The amplifier controller powered the output hardware up.
    AmplifierOn,
    /// One line of the `whatison` source dump.
    SourceStatus {
        /// Source name ("player", "tone", "speech").
        kind: &'static str,
        /// Index within its kind.
        index: u8,
        /// Whether the source is producing sound.
        playing: bool,
        /// Current volume in percent.
        volume: u8,
        /// Outstanding handle count (0 for generators).
        refs: u8,
        /// Fade step per block in raw gain units (0 = not fading).
        fade_speed: u16,
    },
}

impl Notice {
    /// Severity of this notice.
    pub fn level(&self) -> Level {
        match self {
            Self::PoolExhausted { .. } | Self::StaleReference { .. } => Level::Warn,
            Self::AmplifierOff | Self::AmplifierOn | Self::SourceStatus { .. } => Level::Info,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoolExhausted { attempt } => {
                write!(f, "pool exhausted, retrying (attempt {attempt})")
            }
            Self::StaleReference { slot, refs } => {
                write!(f, "stale reference reclaimed: player {slot} had {refs} refs")
            }
            Self::AmplifierOff => f.write_str("Amplifier off."),
            Self::AmplifierOn => f.write_str("Amplifier on."),
            Self::SourceStatus {
                kind,
                index,
                playing,
                volume,
                refs,
                fade_speed,
            } => write!(
                f,
                "{kind} {index}: {} (volume = {volume} refs = {refs} fade speed = {fade_speed})",
                if *playing { "On" } else { "Off" }
            ),
        }
    }
}

/// Destination for diagnostic notices.
///
/// Takes `&self` so a single sink can be shared by every task and by the
/// sound system without exclusive borrows.
pub trait DiagnosticSink {
    /// Record one notice.
    fn notice(&self, notice: Notice);
}

/// Sink that forwards notices to the enabled logging backend.
///
/// With the `defmt` feature notices go to `defmt` (RTT on hardware); with the
/// `tracing` feature they go to `tracing`. With neither they are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn notice(&self, notice: Notice) {
        #[cfg(feature = "defmt")]
        match notice.level() {
            Level::Info => defmt::info!("{}", notice),
            Level::Warn => defmt::warn!("{}", notice),
        }
        #[cfg(feature = "tracing")]
        match notice.level() {
            Level::Info => tracing::info!("{}", notice),
            Level::Warn => tracing::warn!("{}", notice),
        }
        #[cfg(not(any(feature = "defmt", feature = "tracing")))]
        let _ = notice;
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn notice(&self, _notice: Notice) {}
}
