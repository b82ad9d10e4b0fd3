//! Mock implementations for testing
//!
//! This module provides mock implementations of the platform traits for use
//! in unit and integration tests across the workspace. All of them record
//! what they were asked to do so tests can assert on it.

#![cfg(any(test, feature = "std"))]

use core::cell::RefCell;

use crate::audio::{OutputSink, SinkStatus};
use crate::audio_config::{AudioConfig, Block};
use crate::diagnostics::{DiagnosticSink, Notice};
use crate::power::AmpDriver;

/// Mock amplifier that records all calls for test assertions.
#[derive(Debug, Default)]
pub struct MockAmp {
    /// Whether the amplifier is currently enabled.
    pub enabled: bool,
    /// Total number of times [`AmpDriver::enable`] has been called.
    pub enable_count: usize,
    /// Total number of times [`AmpDriver::disable`] has been called.
    pub disable_count: usize,
}

impl MockAmp {
    /// Create a new mock amplifier. Starts in the disabled state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AmpDriver for MockAmp {
    type Error = core::convert::Infallible;

    #[allow(clippy::arithmetic_side_effects)] // Mock counter; overflow not a concern in tests
    fn enable(&mut self) -> Result<(), Self::Error> {
        self.enabled = true;
        self.enable_count += 1;
        Ok(())
    }

    #[allow(clippy::arithmetic_side_effects)] // Mock counter; overflow not a concern in tests
    fn disable(&mut self) -> Result<(), Self::Error> {
        self.enabled = false;
        self.disable_count += 1;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Mock output sink: counts blocks and keeps the most recent one.
#[derive(Debug, Default)]
pub struct MockSink {
    /// Configuration passed to the last `start`.
    pub config: Option<AudioConfig>,
    /// Blocks accepted while running.
    pub accepted: usize,
    /// Blocks dropped because the sink was stopped.
    pub dropped: usize,
    /// Copy of the last accepted block.
    pub last: Option<Block>,
    running: bool,
}

impl MockSink {
    /// Create a stopped mock sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for MockSink {
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

    #[allow(clippy::arithmetic_side_effects)] // Mock counter; overflow not a concern in tests
    fn write_block(&mut self, block: &Block) -> SinkStatus {
        if !self.running {
            self.dropped += 1;
            return SinkStatus::Dropped;
        }
        self.accepted += 1;
        self.last = Some(*block);
        SinkStatus::Accepted
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Diagnostic sink that keeps the first 64 notices.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: RefCell<heapless::Vec<Notice, 64>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn notices(&self) -> heapless::Vec<Notice, 64> {
        self.notices.borrow().clone()
    }

    /// Number of recorded notices equal to `notice`.
    pub fn count(&self, notice: &Notice) -> usize {
        self.notices.borrow().iter().filter(|n| *n == notice).count()
    }

    /// Number of recorded notices matching `pred`.
    pub fn count_where(&self, pred: impl Fn(&Notice) -> bool) -> usize {
        self.notices.borrow().iter().filter(|n| pred(n)).count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.notices.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn notice(&self, notice: Notice) {
        // Full recorder: drop silently, tests never emit more than 64.
        let _ = self.notices.borrow_mut().push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_config::SILENCE;

    #[test]
    fn mock_amp_starts_disabled() {
        let amp = MockAmp::new();
        assert!(!amp.is_enabled(), "amp should start disabled");
        assert_eq!(amp.enable_count, 0);
        assert_eq!(amp.disable_count, 0);
    }

    #[test]
    fn mock_amp_counts_toggles() {
        let mut amp = MockAmp::new();
        for _ in 0..5 {
            amp.enable().unwrap();
            amp.disable().unwrap();
        }
        assert!(!amp.is_enabled());
        assert_eq!(amp.enable_count, 5);
        assert_eq!(amp.disable_count, 5);
    }

    #[test]
    fn mock_sink_drops_blocks_while_stopped() {
        let mut sink = MockSink::new();
        assert_eq!(sink.write_block(&SILENCE), SinkStatus::Dropped);
        sink.start(AudioConfig::default()).unwrap();
        assert_eq!(sink.write_block(&SILENCE), SinkStatus::Accepted);
        sink.stop().unwrap();
        assert_eq!(sink.write_block(&SILENCE), SinkStatus::Dropped);
        assert_eq!((sink.accepted, sink.dropped), (1, 2));
    }

    #[test]
    fn recording_sink_counts_matches() {
        let rec = RecordingSink::new();
        rec.notice(Notice::AmplifierOff);
        rec.notice(Notice::PoolExhausted { attempt: 1 });
        rec.notice(Notice::AmplifierOff);
        assert_eq!(rec.count(&Notice::AmplifierOff), 2);
        assert_eq!(
            rec.count_where(|n| matches!(n, Notice::PoolExhausted { .. })),
            1
        );
        rec.clear();
        assert!(rec.notices().is_empty());
    }
}
