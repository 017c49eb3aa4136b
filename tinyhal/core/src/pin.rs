//! Digital pin capabilities
//!
//! Capabilities are traits, so a function that needs a readable pin says so
//! in its signature and passing a write-only pin is a compile error rather
//! than a runtime surprise.

use core::convert::Infallible;

use crate::register::{Address, RegisterBus};

/// MCU control register holding the global pull-up disable bit
pub const MCUCR: Address = 0x55;

/// Pull-up disable bit in [`MCUCR`]
pub const PUD: u8 = 4;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// High-impedance input
    Input,
    /// Push-pull output
    Output,
}

/// Pin whose output latch can be driven
pub trait DigitalWrite {
    /// Drive the pin high (`true`) or low (`false`)
    fn digital_write(&self, high: bool);
}

/// Pin whose level can be sampled
pub trait DigitalRead {
    /// Sample the pin level
    fn digital_read(&self) -> bool;
}

/// Pin that can switch direction at run time
pub trait IoPin: DigitalWrite + DigitalRead {
    /// Switch to input
    fn set_input_mode(&self);

    /// Switch to output
    fn set_output_mode(&self);
}

/// Configure the direction of `pin`
pub fn pin_mode<P: IoPin>(pin: &P, mode: PinMode) {
    match mode {
        PinMode::Input => pin.set_input_mode(),
        PinMode::Output => pin.set_output_mode(),
    }
}

/// Drive `pin` high or low
pub fn digital_write<P: DigitalWrite>(pin: &P, high: bool) {
    pin.digital_write(high);
}

/// Sample `pin`
pub fn digital_read<P: DigitalRead>(pin: &P) -> bool {
    pin.digital_read()
}

/// Port pin described by its three port registers
///
/// `ddr` selects direction, `port` is the output latch and `pin` the input
/// sampler, all sharing the same bit position.
#[derive(Debug, Clone, Copy)]
pub struct DigitalPin<B> {
    bus: B,
    ddr: Address,
    port: Address,
    pin: Address,
    pos: u8,
}

impl<B: RegisterBus> DigitalPin<B> {
    /// Bind a pin to its port registers
    pub const fn new(bus: B, ddr: Address, port: Address, pin: Address, pos: u8) -> Self {
        assert!(pos < 8, "pin position must be below 8");
        Self {
            bus,
            ddr,
            port,
            pin,
            pos,
        }
    }

    /// Bit position within the port
    pub const fn position(&self) -> u8 {
        self.pos
    }

    fn pull_ups_disabled(&self) -> bool {
        self.bus.read_bit(MCUCR, PUD)
    }

    fn set_direction(&self, output: bool) {
        if self.pull_ups_disabled() {
            self.digital_write(false);
        }
        self.bus.write_bit(self.ddr, self.pos, output);
    }

    /// Whether the output latch is currently high
    pub fn is_latched_high(&self) -> bool {
        self.bus.read_bit(self.port, self.pos)
    }
}

impl<B: RegisterBus> DigitalWrite for DigitalPin<B> {
    fn digital_write(&self, high: bool) {
        self.bus.write_bit(self.port, self.pos, high);
    }
}

impl<B: RegisterBus> DigitalRead for DigitalPin<B> {
    fn digital_read(&self) -> bool {
        self.bus.read_bit(self.pin, self.pos)
    }
}

impl<B: RegisterBus> IoPin for DigitalPin<B> {
    fn set_input_mode(&self) {
        self.set_direction(false);
    }

    fn set_output_mode(&self) {
        self.set_direction(true);
    }
}

impl<B> embedded_hal::digital::ErrorType for DigitalPin<B> {
    type Error = Infallible;
}

impl<B: RegisterBus> embedded_hal::digital::OutputPin for DigitalPin<B> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.digital_write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.digital_write(true);
        Ok(())
    }
}

impl<B: RegisterBus> embedded_hal::digital::StatefulOutputPin for DigitalPin<B> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.is_latched_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_latched_high())
    }
}

impl<B: RegisterBus> embedded_hal::digital::InputPin for DigitalPin<B> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.digital_read())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.digital_read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::RegisterFile;
    use embedded_hal::digital::{OutputPin, StatefulOutputPin};

    const DDRB: Address = 0x24;
    const PORTB: Address = 0x25;
    const PINB: Address = 0x23;

    #[test]
    fn test_output_mode_and_write() {
        let regs = RegisterFile::new();
        let led = DigitalPin::new(&regs, DDRB, PORTB, PINB, 5);

        pin_mode(&led, PinMode::Output);
        assert!(regs.read_bit(DDRB, 5));

        digital_write(&led, true);
        assert_eq!(regs.read_byte(PORTB), 0b0010_0000);
        digital_write(&led, false);
        assert_eq!(regs.read_byte(PORTB), 0);
    }

    #[test]
    fn test_input_sampling() {
        let regs = RegisterFile::new();
        let button = DigitalPin::new(&regs, DDRB, PORTB, PINB, 0);
        pin_mode(&button, PinMode::Input);
        assert!(!digital_read(&button));

        regs.write_byte(PINB, 0b0000_0001);
        assert!(digital_read(&button));
    }

    #[test]
    fn test_latch_cleared_when_pull_ups_disabled() {
        let regs = RegisterFile::new();
        let pin = DigitalPin::new(&regs, DDRB, PORTB, PINB, 2);
        regs.write_byte(PORTB, 0b0000_0100);

        // Pull-ups enabled: latch untouched
        pin.set_input_mode();
        assert_eq!(regs.read_byte(PORTB), 0b0000_0100);

        regs.write_bit(MCUCR, PUD, true);
        pin.set_output_mode();
        assert_eq!(regs.read_byte(PORTB), 0);
        assert!(regs.read_bit(DDRB, 2));
    }

    #[test]
    fn test_embedded_hal_traits() {
        let regs = RegisterFile::new();
        let mut pin = DigitalPin::new(&regs, DDRB, PORTB, PINB, 7);
        pin.set_high().unwrap();
        assert!(pin.is_set_high().unwrap());
        pin.set_low().unwrap();
        assert!(pin.is_set_low().unwrap());
    }
}
