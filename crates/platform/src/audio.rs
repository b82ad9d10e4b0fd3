//! Audio output sink abstraction.
//!
//! The sink is the collaborator at the far end of the real-time path: it
//! receives exactly one [`Block`] per mixer tick. Hardware implementations
//! (I2S DMA, on-chip DAC) live in the firmware crate; this crate only fixes
//! the contract.
//!
//! `write_block` is called from the real-time context, so implementations
//! must not block or allocate. A sink that cannot accept data (DMA half not
//! yet free, peripheral powered down) drops the block and reports it through
//! [`SinkStatus`] instead of waiting.

use crate::audio_config::{AudioConfig, Block};

/// Outcome of handing one block to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkStatus {
    /// Block queued for output.
    Accepted,
    /// Sink was stopped or full; the block was discarded.
    Dropped,
}

/// Consumer of mixed audio blocks.
pub trait OutputSink {
    /// Error type for start/stop.
    type Error: core::fmt::Debug;

    /// Bring the output path up with `config`.
    fn start(&mut self, config: AudioConfig) -> Result<(), Self::Error>;

    /// Shut the output path down. Subsequent blocks are dropped.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Hand over one mixed block. Real-time safe: never blocks.
    fn write_block(&mut self, block: &Block) -> SinkStatus;

    /// Returns `true` between `start` and `stop`.
    fn is_running(&self) -> bool;
}
