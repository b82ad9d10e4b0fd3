//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `VolumePercent`: clamps 0–100, the user-facing master/effect volume
//! - `Gain`: Q2.14 fixed-point multiplier used inside the mixer, derived from
//!   `VolumePercent` or set directly by fades
//! - `SampleRateHz`: validates 8000–96000 Hz range

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── VolumePercent ────────────────────────────────────────────────────────────

/// Volume as a percentage, clamped to 0–100.
///
/// Wraps a `u8` with the invariant `0 <= value <= 100`.
/// Construct with [`VolumePercent::new`] (clamping) or
/// [`VolumePercent::try_new`] (fallible, strict).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct VolumePercent(u8);

impl VolumePercent {
    /// Full volume.
    pub const MAX: Self = Self(100);

    /// Create a `VolumePercent`, clamping values above 100 to 100.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > 100 {
            Self(100)
        } else {
            Self(value)
        }
    }

    /// Create a `VolumePercent`, returning an error if `value > 100`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `value > 100`.
    pub fn try_new(value: u8) -> Result<Self, OutOfRangeError> {
        if value > 100 {
            Err(OutOfRangeError {
                value: u32::from(value),
                min: 0,
                max: 100,
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Return the inner volume value (0–100).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── Gain ─────────────────────────────────────────────────────────────────────

/// Fixed-point gain in Q2.14 format: `Gain::UNITY` (16384) = 1.0.
///
/// The mixer multiplies every sample by a gain and shifts right by
/// [`Gain::SHIFT`]. Values above unity boost (up to ~4.0), zero mutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Gain(u16);

impl Gain {
    /// Number of fractional bits.
    pub const SHIFT: u32 = 14;
    /// 1.0: samples pass through unchanged.
    pub const UNITY: Self = Self(1 << 14);
    /// Silence.
    pub const MUTE: Self = Self(0);

    /// Create a gain from its raw Q2.14 representation.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw Q2.14 value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Convert a [`VolumePercent`] to a gain (100% → unity, 0% → mute).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)] // max 100 * 16384 fits u32; result <= UNITY
    pub fn from_volume(vol: VolumePercent) -> Self {
        let raw = u32::from(vol.get()) * u32::from(Self::UNITY.0) / 100;
        Self(raw as u16)
    }

    /// Closest [`VolumePercent`] for this gain, clamped at 100%.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)] // u16 * 100 fits u32; min(100) fits u8
    pub fn to_volume(self) -> VolumePercent {
        let unity = u32::from(Self::UNITY.0);
        let pct = (u32::from(self.0) * 100 + unity / 2) / unity;
        VolumePercent::new(pct.min(100) as u8)
    }

    /// Scale one sample. The result is not saturated; callers clamp after
    /// accumulation.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)] // i32 * u16 fits i64; clamped before narrowing
    pub fn apply(self, sample: i32) -> i32 {
        if self == Self::UNITY {
            return sample;
        }
        let scaled = (i64::from(sample) * i64::from(self.0)) >> Self::SHIFT;
        scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl From<VolumePercent> for Gain {
    fn from(vol: VolumePercent) -> Self {
        Self::from_volume(vol)
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Output sample rate in Hz, validated to the range the mixer supports.
///
/// Valid range: 8000–96000 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (speech synthesizer native rate).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 96000 Hz.
    pub const MAX_HZ: u32 = 96_000;

    /// The prop's standard CD rate.
    pub const CD: Self = Self(44_100);

    /// Create a `SampleRateHz`, returning an error if out of 8000–96000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 96000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if !(Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        } else {
            Ok(Self(hz))
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}
