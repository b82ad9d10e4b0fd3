//! Discrete amplifier switched by an active-low `SHUTDOWN` pin.
//!
//! Class-D prop amplifiers (PAM8302, MAX98357 and similar) have no control
//! bus. Power is a single GPIO:
//!
//! ```text
//! Pin high → amplifier enabled  (audio passes through)
//! Pin low  → amplifier disabled (shutdown, < 1 µA draw)
//! ```
//!
//! Uses `embedded_hal::digital::OutputPin` (v1.0). The toggle is
//! instantaneous, so the driver is synchronous and safe to call from a
//! cooperative task step.

use embedded_hal::digital::OutputPin;
use platform::AmpDriver;

/// GPIO amplifier driver.
///
/// Holds ownership of the `SHUTDOWN` GPIO pin and tracks the enabled state.
#[derive(Debug)]
pub struct ShutdownPinAmp<P> {
    shutdown_pin: P,
    enabled: bool,
}

impl<P: OutputPin> ShutdownPinAmp<P> {
    /// Take ownership of the `SHUTDOWN` pin and drive it low, so the
    /// amplifier starts disabled.
    pub fn new(mut shutdown_pin: P) -> Self {
        // A broken pin surfaces on the first enable().
        let _ = shutdown_pin.set_low();
        Self {
            shutdown_pin,
            enabled: false,
        }
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.shutdown_pin
    }
}

impl<P: OutputPin> AmpDriver for ShutdownPinAmp<P> {
    type Error = P::Error;

    /// Drive `SHUTDOWN` high.
    fn enable(&mut self) -> Result<(), Self::Error> {
        self.shutdown_pin.set_high()?;
        self.enabled = true;
        Ok(())
    }

    /// Drive `SHUTDOWN` low.
    fn disable(&mut self) -> Result<(), Self::Error> {
        self.shutdown_pin.set_low()?;
        self.enabled = false;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
