//! Pin-level I/O over the MCP23017 for matrix keypad scanning.
//!
//! A matrix keypad is scanned by driving one row pin at a time and sampling the column pins;
//! the scanning loop, debouncing, and keymap all live with the caller. This module only
//! supplies the pin operations that loop needs, translated into expander register writes.
//!
//! The keypad occupies port A of the expander. On the shields this crate targets, port B
//! carries the LCD control and data lines, so every register write here pushes a single
//! byte only: with sequential operation enabled a second data byte would auto-increment
//! into the port B register and corrupt the display lines.

use embedded_hal::i2c;

use crate::{registers, Mcp23017Error};

/// Direction word at reset: port A pins as inputs, port B left to the LCD.
const IODIR_RESET: u16 = 0x00FF;

#[derive(Debug, PartialEq, Copy, Clone)]
/// Direction of an expander pin.
pub enum PinMode {
    /// Pin reads its level from the outside world; pulled up on port A after `begin`
    Input,
    /// Pin drives its level out, e.g. a keypad row being scanned
    Output,
}

/// Pin I/O shim for a matrix keypad attached to a MCP23017.
///
/// Keeps 16-bit shadow copies of the expander's pin state and direction registers so that
/// single-pin updates do not require a read-back from the chip. The shadows match the chip
/// registers after every successful write; a failed I2C transaction leaves them diverged
/// silently, as no write is verified.
pub struct KeypadExpander<I2C>
where
    I2C: i2c::I2c,
{
    i2c: I2C,
    address: u8,
    pin_state: u16,
    iodir_state: u16,
}

impl<I2C> KeypadExpander<I2C>
where
    I2C: i2c::I2c,
{
    /// Create a new keypad shim for the expander at `address`. The address is set by the
    /// A0-A2 straps on the board. No bus traffic happens until [`begin`](Self::begin).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            pin_state: 0,
            iodir_state: IODIR_RESET,
        }
    }

    /// Initialize the expander for keypad use: sequential register addressing, pull-ups
    /// enabled and direction set to input on all port A pins, and the output latch brought
    /// in line with the pulled-up inputs. Ends by refreshing the pin state shadow from
    /// hardware.
    pub fn begin(&mut self) -> Result<(), Mcp23017Error<I2C>> {
        self.iodir_state = IODIR_RESET;
        self.set_register(registers::IOCONA, registers::IOCON_SEQUENTIAL)?;
        self.set_register(registers::GPPUA, 0xFF)?;
        self.set_register(registers::IODIRA, self.iodir_state as u8)?;
        // make the output latch agree with the pulled-up pins
        self.set_register(registers::GPIOA, self.iodir_state as u8)?;
        self.refresh_pin_state()?;
        Ok(())
    }

    /// Set the direction of a single pin, leaving every other bit of the direction
    /// register unchanged.
    pub fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), Mcp23017Error<I2C>> {
        let mask = Self::pin_mask(pin)?;
        match mode {
            PinMode::Output => self.iodir_state &= !mask,
            PinMode::Input => self.iodir_state |= mask,
        }
        self.set_register(registers::IODIRA, self.iodir_state as u8)
    }

    /// Drive a single pin high or low. Operates through the pin state shadow, so the
    /// whole port is rewritten with only bit `pin` changed.
    pub fn pin_write(&mut self, pin: u8, level: bool) -> Result<(), Mcp23017Error<I2C>> {
        let mask = Self::pin_mask(pin)?;
        if level {
            self.pin_state |= mask;
        } else {
            self.pin_state &= !mask;
        }
        self.port_write(self.pin_state)
    }

    /// Read the level of a single pin. Always polls the GPIO registers fresh from
    /// hardware; the shadow is not consulted.
    pub fn pin_read(&mut self, pin: u8) -> Result<bool, Mcp23017Error<I2C>> {
        let mask = Self::pin_mask(pin)?;
        let port = registers::read_register_pair(&mut self.i2c, self.address, registers::GPIOA)
            .map_err(Mcp23017Error::I2cError)?;
        Ok(port & mask == mask)
    }

    /// Write the keypad port in one burst and update the pin state shadow. Only the
    /// low (port A) byte reaches the chip.
    pub fn port_write(&mut self, value: u16) -> Result<(), Mcp23017Error<I2C>> {
        registers::write_register(&mut self.i2c, self.address, registers::GPIOA, value as u8)
            .map_err(Mcp23017Error::I2cError)?;
        self.pin_state = value;
        Ok(())
    }

    /// Re-read both GPIO ports from hardware into the pin state shadow, returning it.
    pub fn refresh_pin_state(&mut self) -> Result<u16, Mcp23017Error<I2C>> {
        self.pin_state =
            registers::read_register_pair(&mut self.i2c, self.address, registers::GPIOA)
                .map_err(Mcp23017Error::I2cError)?;
        Ok(self.pin_state)
    }

    /// The shadowed pin state as of the last write or [`refresh_pin_state`](Self::refresh_pin_state).
    pub fn pin_state(&self) -> u16 {
        self.pin_state
    }

    /// The shadowed direction word. The local copy is always the same as the chip's register.
    pub fn iodir(&self) -> u16 {
        self.iodir_state
    }

    /// Replace the whole direction word. Only the low (port A) byte reaches the chip.
    pub fn set_iodir(&mut self, iodir: u16) -> Result<(), Mcp23017Error<I2C>> {
        self.iodir_state = iodir;
        registers::write_register(
            &mut self.i2c,
            self.address,
            registers::IODIRA,
            self.iodir_state as u8,
        )
        .map_err(Mcp23017Error::I2cError)
    }

    /// Read any expander register directly. Useful for the interrupt-on-change registers
    /// (GPINTEN, DEFVAL, INTCON, INTF, INTCAP) this driver does not model.
    pub fn read_register(&mut self, register: u8) -> Result<u8, Mcp23017Error<I2C>> {
        registers::read_register(&mut self.i2c, self.address, register)
            .map_err(Mcp23017Error::I2cError)
    }

    /// Write any expander register directly.
    pub fn set_register(&mut self, register: u8, value: u8) -> Result<(), Mcp23017Error<I2C>> {
        registers::write_register(&mut self.i2c, self.address, register, value)
            .map_err(Mcp23017Error::I2cError)
    }

    /// returns a reference to the I2C peripheral. mostly needed for testing
    #[cfg(test)]
    fn i2c(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    fn pin_mask(pin: u8) -> Result<u16, Mcp23017Error<I2C>> {
        if pin > 15 {
            return Err(Mcp23017Error::PinOutOfRange);
        }
        Ok(1u16 << pin)
    }
}
