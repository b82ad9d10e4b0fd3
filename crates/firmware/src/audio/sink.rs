//! Output sinks and the real-time render step.
//!
//! Every mixer period the real-time context calls [`render_into`]: mix one
//! block from the [`SoundSystem`] and hand it to the board's
//! [`OutputSink`]. Neither step blocks or allocates.

use platform::{AudioConfig, Block, OutputSink, SinkStatus};
use playback::SoundSystem;

/// Mix one block into `scratch` and pass it to `sink`.
pub fn render_into<S: OutputSink + ?Sized>(
    sound: &SoundSystem,
    sink: &mut S,
    scratch: &mut Block,
) -> SinkStatus {
    sound.tick_into(scratch);
    sink.write_block(scratch)
}

/// Sink for boards without an output path ([`platform::SinkKind::Null`]).
///
/// Accepts blocks while started and discards them, keeping counters and the
/// peak level so bring-up and the host simulator can see that audio flows.
#[derive(Debug, Default)]
pub struct NullOutput {
    config: Option<AudioConfig>,
    running: bool,
    accepted: u32,
    dropped: u32,
    peak: u16,
}

impl NullOutput {
    /// Stopped sink.
    pub const fn new() -> Self {
        Self {
            config: None,
            running: false,
            accepted: 0,
            dropped: 0,
            peak: 0,
        }
    }

    /// Configuration passed to the last `start`.
    pub fn config(&self) -> Option<AudioConfig> {
        self.config
    }

    /// Blocks accepted while running.
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Blocks discarded while stopped.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Largest absolute sample seen since the last [`take_peak`](Self::take_peak).
    pub fn peak(&self) -> u16 {
        self.peak
    }

    /// Return and reset the peak level.
    pub fn take_peak(&mut self) -> u16 {
        core::mem::take(&mut self.peak)
    }
}

impl OutputSink for NullOutput {
    type Error = core::convert::Infallible;

    fn start(&mut self, config: AudioConfig) -> Result<(), Self::Error> {
        self.config = Some(config);
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.running = false;
        Ok(())
    }

    fn write_block(&mut self, block: &Block) -> SinkStatus {
        if !self.running {
            self.dropped = self.dropped.wrapping_add(1);
            return SinkStatus::Dropped;
        }
        self.accepted = self.accepted.wrapping_add(1);
        let block_peak = block.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        self.peak = self.peak.max(block_peak);
        SinkStatus::Accepted
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
