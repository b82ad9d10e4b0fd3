//! Output stream timing for the real-time mixer.
//!
//! The mixer runs once per block. With 44 samples at 44.1 kHz a block lasts
//! 997.7 µs, so the real-time tick is effectively a 1 ms interrupt:
//!
//! ```text
//! period_us = block_samples * 1_000_000 / sample_rate_hz
//!           = 44 * 1_000_000 / 44_100 = 997 µs
//! ```
//!
//! The block length is a compile-time constant because every stream renders
//! into a stack array of exactly [`BLOCK_SAMPLES`] samples; only the sample
//! rate is negotiable at startup.

use crate::audio_types::{OutOfRangeError, SampleRateHz};

/// Samples per mixer block (mono, 16-bit).
pub const BLOCK_SAMPLES: usize = 44;

/// One block of mono PCM samples.
pub type Block = [i16; BLOCK_SAMPLES];

/// A silent block.
pub const SILENCE: Block = [0; BLOCK_SAMPLES];

/// Output stream configuration handed to the mixer and the output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Output sample rate.
    pub sample_rate: SampleRateHz,
}

impl AudioConfig {
    /// Build a configuration for `hz`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if the sample rate is unsupported.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        Ok(Self {
            sample_rate: SampleRateHz::new(hz)?,
        })
    }

    /// Length of one mixer tick in microseconds (rounded down).
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // sample_rate >= 8000 (non-zero); 44 * 1e6 fits u32
    pub fn tick_period_us(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation)] // BLOCK_SAMPLES = 44
        let block = BLOCK_SAMPLES as u32;
        block * 1_000_000 / self.sample_rate.get()
    }

    /// Number of mixer ticks that cover `ms` milliseconds (rounded up).
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // u64 intermediate; sample_rate non-zero
    pub fn ticks_for_ms(&self, ms: u32) -> u32 {
        let samples = u64::from(ms) * u64::from(self.sample_rate.get()) / 1000;
        let block = BLOCK_SAMPLES as u64;
        let ticks = samples.div_ceil(block);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    /// Number of samples in `ms` milliseconds.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // u64 intermediate
    pub fn samples_for_ms(&self, ms: u32) -> u32 {
        let samples = u64::from(ms) * u64::from(self.sample_rate.get()) / 1000;
        u32::try_from(samples).unwrap_or(u32::MAX)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRateHz::CD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tick_is_just_under_one_millisecond() {
        assert_eq!(AudioConfig::default().tick_period_us(), 997);
    }

    #[test]
    fn ticks_for_ms_rounds_up() {
        let cfg = AudioConfig::default();
        // 50 ms = 2205 samples = 50.1 blocks
        assert_eq!(cfg.ticks_for_ms(50), 51);
        assert_eq!(cfg.ticks_for_ms(0), 0);
    }

    #[test]
    fn samples_for_ms_at_cd_rate() {
        assert_eq!(AudioConfig::default().samples_for_ms(1000), 44_100);
    }

    #[test]
    fn rejects_unsupported_rate() {
        assert!(AudioConfig::new(192_000).is_err());
        assert!(AudioConfig::new(22_050).is_ok());
    }
}
