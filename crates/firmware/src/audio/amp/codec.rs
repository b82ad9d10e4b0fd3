//! Codec-controlled amplifier (SGTL5000 analog output stage).
//!
//! On boards with an audio codec the "amplifier" is the codec's headphone
//! and line-out stage. Enabling powers the stage and unmutes it; disabling
//! mutes first and then powers it down, so neither edge clicks. Registers
//! are 16-bit, addressed with 16-bit indices, big-endian on the wire.

use embedded_hal::i2c::I2c;
use platform::AmpDriver;

/// Codec I2C address with `CTRL_ADR0_CS` low.
pub const DEFAULT_ADDRESS: u8 = 0x0A;

/// `CHIP_ANA_CTRL`: analog mute and input select.
pub const CHIP_ANA_CTRL: u16 = 0x0024;
/// `CHIP_ANA_POWER`: analog block power.
pub const CHIP_ANA_POWER: u16 = 0x0030;

/// Line-out, headphone, ADC and DAC powered.
const POWER_OUTPUTS_ON: u16 = 0x40FF;
/// As above with the headphone (bit 4) and line-out (bit 0) stages off.
const POWER_OUTPUTS_OFF: u16 = 0x40EE;
/// Zero-cross detect, line-in selected, headphone unmuted.
const ANA_CTRL_UNMUTED: u16 = 0x0026;
/// As above with headphone (bit 4) and line-out (bit 8) muted.
const ANA_CTRL_MUTED: u16 = 0x0136;

/// Codec amplifier driver.
#[derive(Debug)]
pub struct CodecAmp<I> {
    i2c: I,
    address: u8,
    enabled: bool,
}

impl<I: I2c> CodecAmp<I> {
    /// Driver at [`DEFAULT_ADDRESS`]. No bus traffic until the first call.
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Driver at a specific 7-bit address.
    pub fn with_address(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            enabled: false,
        }
    }

    /// Give the bus back.
    pub fn release(self) -> I {
        self.i2c
    }

    /// Write a 16-bit value to a 16-bit register.
    pub fn write_register(&mut self, register: u16, value: u16) -> Result<(), I::Error> {
        let [r_hi, r_lo] = register.to_be_bytes();
        let [v_hi, v_lo] = value.to_be_bytes();
        self.i2c.write(self.address, &[r_hi, r_lo, v_hi, v_lo])
    }
}

impl<I: I2c> AmpDriver for CodecAmp<I> {
    type Error = I::Error;

    fn enable(&mut self) -> Result<(), Self::Error> {
        self.write_register(CHIP_ANA_POWER, POWER_OUTPUTS_ON)?;
        self.write_register(CHIP_ANA_CTRL, ANA_CTRL_UNMUTED)?;
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.write_register(CHIP_ANA_CTRL, ANA_CTRL_MUTED)?;
        self.write_register(CHIP_ANA_POWER, POWER_OUTPUTS_OFF)?;
        self.enabled = false;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    #[test]
    fn test_new_is_silent_on_the_bus() {
        let mut bus = I2cMock::new(&[]);
        let amp = CodecAmp::new(bus.clone());
        assert!(!amp.is_enabled());
        bus.done();
    }

    #[test]
    fn test_enable_powers_then_unmutes() {
        let expectations = [
            Transaction::write(DEFAULT_ADDRESS, vec![0x00, 0x30, 0x40, 0xFF]),
            Transaction::write(DEFAULT_ADDRESS, vec![0x00, 0x24, 0x00, 0x26]),
        ];
        let mut bus = I2cMock::new(&expectations);
        let mut amp = CodecAmp::new(bus.clone());
        amp.enable().unwrap();
        assert!(amp.is_enabled());
        bus.done();
    }

    #[test]
    fn test_disable_mutes_then_powers_down() {
        let expectations = [
            Transaction::write(0x2A, vec![0x00, 0x24, 0x01, 0x36]),
            Transaction::write(0x2A, vec![0x00, 0x30, 0x40, 0xEE]),
        ];
        let mut bus = I2cMock::new(&expectations);
        let mut amp = CodecAmp::with_address(bus.clone(), 0x2A);
        amp.disable().unwrap();
        assert!(!amp.is_enabled());
        bus.done();
    }

    #[test]
    fn test_bus_error_leaves_state_unchanged() {
        let expectations = [Transaction::write(DEFAULT_ADDRESS, vec![0x00, 0x30, 0x40, 0xFF])
            .with_error(ErrorKind::Other)];
        let mut bus = I2cMock::new(&expectations);
        let mut amp = CodecAmp::new(bus.clone());
        assert!(amp.enable().is_err());
        assert!(!amp.is_enabled());
        bus.done();
    }
}
