//! Amplifier power control abstraction.
//!
//! The prop's speaker amplifier (or audio codec) is switched by a single
//! control: a `SHUTDOWN`/enable GPIO on discrete class-D amps, or the codec's
//! analog power bits on boards with an SGTL5000-style codec. Either way the
//! switch is instantaneous, so the trait is synchronous and can be driven from
//! a cooperative task step.

/// Amplifier driver trait.
///
/// Implemented by the GPIO amp driver, the codec driver and [`crate::mocks::MockAmp`].
pub trait AmpDriver {
    /// Error type returned by amplifier operations.
    type Error: core::fmt::Debug;

    /// Enable the amplifier. After this call audio passes through.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Disable the amplifier (shutdown / low-power state).
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Returns `true` if the amplifier is currently enabled.
    fn is_enabled(&self) -> bool;
}

/// Observable power state of the amplifier controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Output hardware powered down.
    Off,
    /// Powered and something is (or was just) playing.
    On,
    /// Activity stopped; waiting out the poll interval and grace delay
    /// before powering down.
    IdlePending,
}

impl PowerState {
    /// Short label for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::IdlePending => "idle-pending",
        }
    }
}
