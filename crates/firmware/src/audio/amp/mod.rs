//! Amplifier power switches
//!
//! The board configuration names one of three switch types:
//! - [`gpio`]: discrete amplifier with an active-low `SHUTDOWN` pin
//! - [`codec`]: audio codec whose analog output stage is powered over I2C
//! - none: the host simulator, where only the logical state is tracked
//!
//! [`BoardAmp`] wraps whichever one the board has so the amplifier task is
//! instantiated once, with one concrete type, regardless of the board.

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::i2c::{self, I2c, Operation};
use platform::{AmpDriver, AmpKind};

pub mod codec;
pub mod gpio;

use codec::CodecAmp;
use gpio::ShutdownPinAmp;

/// Amplifier switch selected from [`AmpKind`].
#[derive(Debug)]
pub enum BoardAmp<P, I> {
    /// GPIO shutdown pin.
    Gpio(ShutdownPinAmp<P>),
    /// Codec analog power over I2C.
    Codec(CodecAmp<I>),
    /// No physical switch.
    Detached {
        /// Logical power state.
        enabled: bool,
    },
}

/// Failure of the selected switch, or a missing resource at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardAmpError<PE, IE> {
    /// Driving the shutdown pin failed.
    #[error("amplifier shutdown pin: {0:?}")]
    Pin(PE),
    /// Talking to the codec failed.
    #[error("codec bus: {0:?}")]
    Bus(IE),
    /// The board needs a pin or bus that was not supplied.
    #[error("no resource supplied for {0:?} amplifier")]
    Missing(AmpKind),
}

impl<P: OutputPin, I: I2c> BoardAmp<P, I> {
    /// Build the switch for `kind` from the resources the board provides.
    ///
    /// `Gpio` consumes `pin`, `Codec` consumes `bus`, `Mock` needs neither.
    /// Resources the selected kind does not use are dropped.
    pub fn for_board(
        kind: AmpKind,
        pin: Option<P>,
        bus: Option<I>,
    ) -> Result<Self, BoardAmpError<P::Error, I::Error>> {
        match kind {
            AmpKind::Gpio => pin
                .map(|p| Self::Gpio(ShutdownPinAmp::new(p)))
                .ok_or(BoardAmpError::Missing(kind)),
            AmpKind::Codec => bus
                .map(|b| Self::Codec(CodecAmp::new(b)))
                .ok_or(BoardAmpError::Missing(kind)),
            AmpKind::Mock => Ok(Self::Detached { enabled: false }),
        }
    }
}

impl<P: OutputPin, I: I2c> AmpDriver for BoardAmp<P, I> {
    type Error = BoardAmpError<P::Error, I::Error>;

    fn enable(&mut self) -> Result<(), Self::Error> {
        match self {
            Self::Gpio(amp) => amp.enable().map_err(BoardAmpError::Pin),
            Self::Codec(amp) => amp.enable().map_err(BoardAmpError::Bus),
            Self::Detached { enabled } => {
                *enabled = true;
                Ok(())
            }
        }
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        match self {
            Self::Gpio(amp) => amp.disable().map_err(BoardAmpError::Pin),
            Self::Codec(amp) => amp.disable().map_err(BoardAmpError::Bus),
            Self::Detached { enabled } => {
                *enabled = false;
                Ok(())
            }
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            Self::Gpio(amp) => amp.is_enabled(),
            Self::Codec(amp) => amp.is_enabled(),
            Self::Detached { enabled } => *enabled,
        }
    }
}

/// Stand-in type for a pin or bus the board does not have.
///
/// Fills the unused type parameter of [`BoardAmp`]; every operation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unfitted;

/// Error returned by every [`Unfitted`] operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnfittedError;

impl digital::Error for UnfittedError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl i2c::Error for UnfittedError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

impl digital::ErrorType for Unfitted {
    type Error = UnfittedError;
}

impl OutputPin for Unfitted {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(UnfittedError)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(UnfittedError)
    }
}

impl i2c::ErrorType for Unfitted {
    type Error = UnfittedError;
}

impl I2c for Unfitted {
    fn transaction(
        &mut self,
        _address: u8,
        _operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        Err(UnfittedError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    type HostAmp = BoardAmp<Unfitted, Unfitted>;

    #[test]
    fn test_mock_kind_is_detached() {
        let mut amp = HostAmp::for_board(AmpKind::Mock, None, None).unwrap();
        assert!(!amp.is_enabled());
        amp.enable().unwrap();
        assert!(amp.is_enabled());
        amp.disable().unwrap();
        assert!(!amp.is_enabled());
    }

    #[test]
    fn test_missing_resource_is_reported() {
        let err = HostAmp::for_board(AmpKind::Gpio, None, None).unwrap_err();
        assert_eq!(err, BoardAmpError::Missing(AmpKind::Gpio));
        let err = HostAmp::for_board(AmpKind::Codec, None, None).unwrap_err();
        assert_eq!(err, BoardAmpError::Missing(AmpKind::Codec));
    }

    #[test]
    fn test_unfitted_bus_errors_surface() {
        let mut amp = HostAmp::for_board(AmpKind::Codec, None, Some(Unfitted)).unwrap();
        assert_eq!(amp.enable(), Err(BoardAmpError::Bus(UnfittedError)));
        assert!(!amp.is_enabled());
    }

    #[test]
    fn test_gpio_kind_drives_the_pin() {
        let expectations = [
            PinTransaction::set(State::Low), // construction
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ];
        let mut pin = PinMock::new(&expectations);
        let mut amp =
            BoardAmp::<_, Unfitted>::for_board(AmpKind::Gpio, Some(pin.clone()), None).unwrap();
        amp.enable().unwrap();
        assert!(amp.is_enabled());
        amp.disable().unwrap();
        assert!(!amp.is_enabled());
        pin.done();
    }
}
