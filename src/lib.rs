//! `embedded-hal`-based drivers for the two peripherals commonly hung off a
//! [MCP23017](https://ww1.microchip.com/downloads/en/devicedoc/20001952c.pdf) 16-bit I2C port
//! expander on keypad/LCD shields: a matrix-keypad pin I/O layer on port A and a
//! [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller) compatible character
//! display driven in 4-bit mode from port B. Both drivers speak the expander's
//! register-address-then-data protocol and work in an embedded, `no_std` environment.
//!
//! Key features include:
//! - Pin-level `pin_mode`/`pin_write`/`pin_read`/`port_write` operations over the expander,
//!   suitable for feeding an external matrix-keypad scanning routine
//! - Shadowed 16-bit pin state and direction registers to avoid read-back on every access
//! - Convenient high-level API for controlling the display, with backlight control
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Compatible with the `embedded-hal` traits v1.0 and later
//! - Direct register access for the expander's interrupt-on-change machinery
//! - Optional support for the `defmt` and `ufmt` logging frameworks
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! mcp23017-lcd-keypad = { version = "0.1", features = ["defmt"] }
//! ```
//!
//! Then create the driver for the peripheral wired to your expander:
//! ```rust
//! use mcp23017_lcd_keypad::{CharacterDisplay, LcdDisplayType};
//!
//! // board setup
//! let i2c = ...; // I2C peripheral
//! let delay = ...; // DelayNs implementation
//!
//! // It is recommended that the `i2c` object be wrapped in an `embedded_hal_bus::i2c::CriticalSectionDevice`
//! // so that it can be shared between multiple peripherals.
//!
//! // LCD on port B of the expander at the default address 0x27
//! let mut lcd = CharacterDisplay::new(i2c, LcdDisplayType::Lcd16x2, delay);
//! lcd.init()?;
//! lcd.backlight(true)?.clear()?.home()?;
//! lcd.print("Hello, world!")?;
//!
//! // can also use the `core::fmt::write!` macro
//! use core::fmt::Write;
//! write!(lcd, "Hello, world!")?;
//! ```
//! For the keypad side, the expander address is set by the shield's address straps:
//! ```rust
//! use mcp23017_lcd_keypad::{KeypadExpander, PinMode};
//!
//! let mut keypad = KeypadExpander::new(i2c, 0x20);
//! keypad.begin()?;
//! // drive a row low, read a column - the scanning loop itself lives with the caller
//! keypad.pin_mode(3, PinMode::Output)?;
//! keypad.pin_write(3, false)?;
//! let pressed = !keypad.pin_read(4)?;
//! ```
//!
//! The display methods each return a `Result` that wraps the display object in `Ok()`, allowing
//! for easy chaining of commands. For example:
//! ```rust
//! lcd.backlight(true)?.clear()?.home()?.print("Hello, world!")?;
//! ```
#![no_std]

use core::fmt::Display;

use embedded_hal::i2c;

pub mod registers;

mod keypad;
mod lcd;

pub use keypad::{KeypadExpander, PinMode};
pub use lcd::CharacterDisplay;

#[derive(Debug, PartialEq, Copy, Clone)]
/// Errors that can occur when using the MCP23017 drivers
pub enum Mcp23017Error<I2C>
where
    I2C: i2c::I2c,
{
    /// I2C error returned from the underlying I2C implementation
    I2cError(I2C::Error),
    /// Row is out of range
    RowOutOfRange,
    /// Column is out of range
    ColumnOutOfRange,
    /// Pin index is not within the expander's 16 GPIO pins
    PinOutOfRange,
    /// Formatting error
    FormattingError(core::fmt::Error),
}

impl<I2C> From<core::fmt::Error> for Mcp23017Error<I2C>
where
    I2C: i2c::I2c,
{
    fn from(err: core::fmt::Error) -> Self {
        Mcp23017Error::FormattingError(err)
    }
}

impl<I2C> From<&Mcp23017Error<I2C>> for &'static str
where
    I2C: i2c::I2c,
{
    fn from(err: &Mcp23017Error<I2C>) -> Self {
        match err {
            Mcp23017Error::I2cError(_) => "I2C error",
            Mcp23017Error::RowOutOfRange => "Row out of range",
            Mcp23017Error::ColumnOutOfRange => "Column out of range",
            Mcp23017Error::PinOutOfRange => "Pin out of range",
            Mcp23017Error::FormattingError(_) => "Formatting error",
        }
    }
}

#[cfg(feature = "defmt")]
impl<I2C> defmt::Format for Mcp23017Error<I2C>
where
    I2C: i2c::I2c,
{
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<I2C> ufmt::uDisplay for Mcp23017Error<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<I2C> Display for Mcp23017Error<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// The type of LCD display. This is used to determine the number of rows and columns, and the row offsets.
pub enum LcdDisplayType {
    /// 20x4 display
    Lcd20x4,
    /// 20x2 display
    Lcd20x2,
    /// 16x2 display
    Lcd16x2,
    /// 16x4 display
    Lcd16x4,
    /// 8x2 display
    Lcd8x2,
    /// 40x2 display
    Lcd40x2,
}

impl From<&LcdDisplayType> for &'static str {
    fn from(display_type: &LcdDisplayType) -> Self {
        match display_type {
            LcdDisplayType::Lcd20x4 => "20x4",
            LcdDisplayType::Lcd20x2 => "20x2",
            LcdDisplayType::Lcd16x2 => "16x2",
            LcdDisplayType::Lcd16x4 => "16x4",
            LcdDisplayType::Lcd8x2 => "8x2",
            LcdDisplayType::Lcd40x2 => "40x2",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LcdDisplayType {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for LcdDisplayType {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for LcdDisplayType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

impl LcdDisplayType {
    /// Get the number of rows for the display type
    pub(crate) const fn rows(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 4,
            LcdDisplayType::Lcd20x2 => 2,
            LcdDisplayType::Lcd16x2 => 2,
            LcdDisplayType::Lcd16x4 => 4,
            LcdDisplayType::Lcd8x2 => 2,
            LcdDisplayType::Lcd40x2 => 2,
        }
    }

    /// Get the number of columns for the display type
    pub(crate) const fn cols(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 20,
            LcdDisplayType::Lcd20x2 => 20,
            LcdDisplayType::Lcd16x2 => 16,
            LcdDisplayType::Lcd16x4 => 16,
            LcdDisplayType::Lcd8x2 => 8,
            LcdDisplayType::Lcd40x2 => 40,
        }
    }

    /// Get the row offsets for the display type. This always returns an array of length 4.
    /// For displays with less than 4 rows, the unused rows will be set to offsets offscreen.
    pub(crate) const fn row_offsets(&self) -> [u8; 4] {
        match self {
            LcdDisplayType::Lcd20x4 => [0x00, 0x40, 0x14, 0x54],
            LcdDisplayType::Lcd20x2 => [0x00, 0x40, 0x00, 0x40],
            LcdDisplayType::Lcd16x2 => [0x00, 0x40, 0x10, 0x50],
            LcdDisplayType::Lcd16x4 => [0x00, 0x40, 0x10, 0x50],
            LcdDisplayType::Lcd8x2 => [0x00, 0x40, 0x00, 0x40],
            LcdDisplayType::Lcd40x2 => [0x00, 0x40, 0x00, 0x40],
        }
    }
}
