//! HD44780 character display driver for the MCP23017 LCD shield.
//!
//! The display's 4-bit data bus and control lines are wired to port B of the expander:
//!
//! ```text
//!   B7 B6 B5 B4 B3 B2 B1 B0
//!   RS RW EN D7 D6 D5 D4 BL
//! ```
//!
//! Every command or character byte is split into two nibble bursts, high nibble first.
//! Each burst is a `[GPIOB, bits]` register write issued twice: once with EN high and
//! once with EN low, since the controller latches the nibble on EN's falling edge. RW
//! stays low throughout; this driver never reads the controller back.

use bitfield::bitfield;
use embedded_hal::{delay::DelayNs, i2c};

use crate::{registers, LcdDisplayType, Mcp23017Error};

// commands
const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
const LCD_CMD_RETURNHOME: u8 = 0x02; //  Set cursor position to zero
const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Controls the display; does stuff like turning it off and on
const LCD_CMD_CURSORSHIFT: u8 = 0x10; //  Lets you move the cursor
const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Used to send the function to set to the display
const LCD_CMD_SETCGRAMADDR: u8 = 0x40; //  Used to set the CGRAM (character generator RAM) with characters
const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Used to set the DDRAM (Display Data RAM)

// flags for display entry mode
const LCD_FLAG_ENTRYLEFT: u8 = 0x02; //  Used to set text to flow from left to right
const LCD_FLAG_ENTRYSHIFTINCREMENT: u8 = 0x01; //  Used to 'right justify' text from the cursor
const LCD_FLAG_ENTRYSHIFTDECREMENT: u8 = 0x00; //  Used to 'left justify' text from the cursor

// flags for display on/off control
const LCD_FLAG_DISPLAYON: u8 = 0x04; //  Turns the display on
const LCD_FLAG_CURSORON: u8 = 0x02; //  Turns the cursor on
const LCD_FLAG_BLINKON: u8 = 0x01; //  Turns on the blinking cursor

// flags for display/cursor shift
const LCD_FLAG_DISPLAYMOVE: u8 = 0x08; //  Flag for moving the display
const LCD_FLAG_MOVERIGHT: u8 = 0x04; //  Flag for moving right
const LCD_FLAG_MOVELEFT: u8 = 0x00; //  Flag for moving left

// flags for function set
const LCD_FLAG_8BITMODE: u8 = 0x10; //  LCD 8 bit mode
const LCD_FLAG_4BITMODE: u8 = 0x00; //  LCD 4 bit mode
const LCD_FLAG_2LINE: u8 = 0x08; //  LCD 2 line mode
const LCD_FLAG_1LINE: u8 = 0x00; //  LCD 1 line mode
const LCD_FLAG_5x8_DOTS: u8 = 0x00; //  8 pixel high font mode

// Pin packing of the shield's port B byte. The data nibble sits in bits 4..1 with
// D4 in bit 1, so a nibble value lands shifted left by one.
bitfield! {
    pub(crate) struct LcdPortBits(u8);
    impl Debug;
    u8;
    pub backlight, set_backlight: 0, 0;
    pub data, set_data: 4, 1;
    pub enable, set_enable: 5, 5;
    pub rw, set_rw: 6, 6;
    pub rs, set_rs: 7, 7;
}

/// HD44780 based character display attached to port B of a MCP23017.
pub struct CharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    i2c: I2C,
    address: u8,
    lcd_type: LcdDisplayType,
    delay: DELAY,
    backlight: bool,
    display_function: u8,
    display_control: u8,
    display_mode: u8,
}

impl<I2C, DELAY> CharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    /// Default I2C address of the MCP23017 on the LCD shield.
    pub const DEFAULT_I2C_ADDRESS: u8 = 0x27;

    /// Create a new display object with the default I2C address. The backlight starts
    /// on so the display is usable even if `backlight` is never called.
    pub fn new(i2c: I2C, lcd_type: LcdDisplayType, delay: DELAY) -> Self {
        Self::new_with_address(i2c, Self::DEFAULT_I2C_ADDRESS, lcd_type, delay)
    }

    /// Create a new display object with a specific I2C address.
    pub fn new_with_address(i2c: I2C, address: u8, lcd_type: LcdDisplayType, delay: DELAY) -> Self {
        Self {
            i2c,
            address,
            lcd_type,
            delay,
            backlight: true,
            display_function: LCD_FLAG_4BITMODE | LCD_FLAG_1LINE | LCD_FLAG_5x8_DOTS,
            display_control: 0,
            display_mode: 0,
        }
    }

    /// Initialize the display. This must be called before using the display.
    ///
    /// Runs the fixed power-on sequence from the HD44780 datasheet: three wake-up
    /// bursts to force the controller out of whatever mode a previous reset left it
    /// in, a fourth burst to drop into 4-bit mode, then function set, display on,
    /// clear, and entry mode.
    pub fn init(&mut self) -> Result<(), Mcp23017Error<I2C>> {
        // the controller needs at least 40ms after power rises above 2.7V before it
        // accepts commands; the host can be up well before the panel
        self.delay.delay_ms(50);

        // all eight port B pins drive the display
        self.set_register(registers::IODIRB, 0x00)?;

        self.display_function = LCD_FLAG_4BITMODE | LCD_FLAG_5x8_DOTS;
        if self.lcd_type.rows() > 1 {
            self.display_function |= LCD_FLAG_2LINE;
        } else {
            self.display_function |= LCD_FLAG_1LINE;
        }

        // software reset into 4-bit mode per the datasheet: nibble 0011 three times,
        // then 0010. The backlight bit is not carried in these raw bursts.
        let mut wake = LcdPortBits(0);
        wake.set_data((LCD_CMD_FUNCTIONSET | LCD_FLAG_8BITMODE) >> 4);
        for _ in 0..3 {
            wake.set_enable(1);
            self.write_port_b(wake.0)?;
            wake.set_enable(0);
            self.write_port_b(wake.0)?;
        }
        wake.set_data(LCD_CMD_FUNCTIONSET >> 4);
        wake.set_enable(1);
        self.write_port_b(wake.0)?;
        wake.set_enable(0);
        self.write_port_b(wake.0)?;
        self.delay.delay_ms(5);

        // function set is sent twice per the datasheet's reset procedure
        self.command(LCD_CMD_FUNCTIONSET | self.display_function)?;
        self.delay.delay_ms(5);
        self.command(LCD_CMD_FUNCTIONSET | self.display_function)?;
        self.delay.delay_ms(5);

        self.display_control = LCD_FLAG_DISPLAYON;
        self.command(LCD_CMD_DISPLAYCONTROL | self.display_control)?;
        self.clear()?;

        self.display_mode = LCD_FLAG_ENTRYLEFT | LCD_FLAG_ENTRYSHIFTDECREMENT;
        self.command(LCD_CMD_ENTRYMODESET | self.display_mode)?;

        Ok(())
    }

    /// returns the `LcdDisplayType` used to create the display
    pub fn display_type(&self) -> LcdDisplayType {
        self.lcd_type
    }

    /// returns a reference to the I2C peripheral. mostly needed for testing
    #[cfg(test)]
    fn i2c(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    //--------------------------------------------------------------------------------------------------
    // high level commands, for the user!
    //--------------------------------------------------------------------------------------------------

    /// Clear the display
    pub fn clear(&mut self) -> Result<&mut Self, Mcp23017Error<I2C>> {
        self.command(LCD_CMD_CLEARDISPLAY)?;
        // this command takes a long time
        self.delay.delay_us(2000);
        Ok(self)
    }

    /// Set the cursor to the home position.
    pub fn home(&mut self) -> Result<&mut Self, Mcp23017Error<I2C>> {
        self.command(LCD_CMD_RETURNHOME)?;
        // this command takes a long time
        self.delay.delay_us(2000);
        Ok(self)
    }

    /// Set the cursor position at specified column and row. Columns and rows are zero-indexed.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<&mut Self, Mcp23017Error<I2C>> {
        if row >= self.lcd_type.rows() {
            return Err(Mcp23017Error::RowOutOfRange);
        }
        if col >= self.lcd_type.cols() {
            return Err(Mcp23017Error::ColumnOutOfRange);
        }
        self.command(LCD_CMD_SETDDRAMADDR | (col + self.lcd_type.row_offsets()[row as usize]))?;
        Ok(self)
    }

    /// Set the display visibility.
    pub fn show_display(&mut self, show_display: bool) -> Result<&mut Self, Mcp23017Error<I2C>> {
        if show_display {
            self.display_control |= LCD_FLAG_DISPLAYON;
        } else {
            self.display_control &= !LCD_FLAG_DISPLAYON;
        }
        self.command(LCD_CMD_DISPLAYCONTROL | self.display_control)?;
        Ok(self)
    }

    /// Set the cursor visibility.
    pub fn show_cursor(&mut self, show_cursor: bool) -> Result<&mut Self, Mcp23017Error<I2C>> {
        if show_cursor {
            self.display_control |= LCD_FLAG_CURSORON;
        } else {
            self.display_control &= !LCD_FLAG_CURSORON;
        }
        self.command(LCD_CMD_DISPLAYCONTROL | self.display_control)?;
        Ok(self)
    }

    /// Set the cursor blinking.
    pub fn blink_cursor(&mut self, blink_cursor: bool) -> Result<&mut Self, Mcp23017Error<I2C>> {
        if blink_cursor {
            self.display_control |= LCD_FLAG_BLINKON;
        } else {
            self.display_control &= !LCD_FLAG_BLINKON;
        }
        self.command(LCD_CMD_DISPLAYCONTROL | self.display_control)?;
        Ok(self)
    }

    /// Scroll the display to the left without changing the RAM.
    pub fn scroll_display_left(&mut self) -> Result<&mut Self, Mcp23017Error<I2C>> {
        self.command(LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVELEFT)?;
        Ok(self)
    }

    /// Scroll the display to the right without changing the RAM.
    pub fn scroll_display_right(&mut self) -> Result<&mut Self, Mcp23017Error<I2C>> {
        self.command(LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVERIGHT)?;
        Ok(self)
    }

    /// Set the text flow direction to left to right.
    pub fn left_to_right(&mut self) -> Result<&mut Self, Mcp23017Error<I2C>> {
        self.display_mode |= LCD_FLAG_ENTRYLEFT;
        self.command(LCD_CMD_ENTRYMODESET | self.display_mode)?;
        Ok(self)
    }

    /// Set the text flow direction to right to left.
    pub fn right_to_left(&mut self) -> Result<&mut Self, Mcp23017Error<I2C>> {
        self.display_mode &= !LCD_FLAG_ENTRYLEFT;
        self.command(LCD_CMD_ENTRYMODESET | self.display_mode)?;
        Ok(self)
    }

    /// Set the auto scroll mode.
    pub fn autoscroll(&mut self, autoscroll: bool) -> Result<&mut Self, Mcp23017Error<I2C>> {
        if autoscroll {
            self.display_mode |= LCD_FLAG_ENTRYSHIFTINCREMENT;
        } else {
            self.display_mode &= !LCD_FLAG_ENTRYSHIFTINCREMENT;
        }
        self.command(LCD_CMD_ENTRYMODESET | self.display_mode)?;
        Ok(self)
    }

    /// Create a new custom character in one of the 8 CGRAM locations.
    pub fn create_char(
        &mut self,
        location: u8,
        charmap: [u8; 8],
    ) -> Result<&mut Self, Mcp23017Error<I2C>> {
        self.command(LCD_CMD_SETCGRAMADDR | ((location & 0x7) << 3))?;
        for &charmap_byte in charmap.iter() {
            self.write_byte(charmap_byte)?;
        }
        Ok(self)
    }

    /// Prints a string to the LCD at the current cursor position.
    pub fn print(&mut self, text: &str) -> Result<&mut Self, Mcp23017Error<I2C>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Printing: {}", text);
        for &byte in text.as_bytes() {
            self.write_byte(byte)?;
        }
        Ok(self)
    }

    /// Turn the backlight on or off.
    pub fn backlight(&mut self, on: bool) -> Result<&mut Self, Mcp23017Error<I2C>> {
        self.backlight = on;
        // rewrite port B with only the backlight bit; EN is low and the data
        // lines are idle, so nothing else is affected
        let mut bits = LcdPortBits(0);
        bits.set_backlight(on as u8);
        self.write_port_b(bits.0)?;
        Ok(self)
    }

    //--------------------------------------------------------------------------------------------------
    // mid level commands, for sending data/cmds
    //--------------------------------------------------------------------------------------------------

    /// Writes a command byte to the display's instruction register.
    pub fn command(&mut self, value: u8) -> Result<(), Mcp23017Error<I2C>> {
        self.send(value, false)
    }

    /// Writes a data byte to the display, either the CGRAM or DDRAM depending on the
    /// prior command sent.
    pub fn write_byte(&mut self, value: u8) -> Result<(), Mcp23017Error<I2C>> {
        self.send(value, true)
    }

    /// Read any expander register directly. Useful for the interrupt-on-change registers
    /// this driver does not model.
    pub fn read_register(&mut self, register: u8) -> Result<u8, Mcp23017Error<I2C>> {
        registers::read_register(&mut self.i2c, self.address, register)
            .map_err(Mcp23017Error::I2cError)
    }

    /// Write any expander register directly.
    pub fn set_register(&mut self, register: u8, value: u8) -> Result<(), Mcp23017Error<I2C>> {
        registers::write_register(&mut self.i2c, self.address, register, value)
            .map_err(Mcp23017Error::I2cError)
    }

    /// Send a full byte as two nibble bursts, high nibble first. `rs_setting` of `true`
    /// writes the data register, `false` the instruction register.
    fn send(&mut self, value: u8, rs_setting: bool) -> Result<(), Mcp23017Error<I2C>> {
        // RW is held low, this driver only ever writes
        let mut bits = LcdPortBits(0);
        bits.set_backlight(self.backlight as u8);
        bits.set_rs(rs_setting as u8);
        for nibble in [value >> 4, value & 0x0F] {
            bits.set_data(nibble);
            bits.set_enable(1);
            self.write_port_b(bits.0)?;
            // the controller latches the nibble on the falling edge of EN
            bits.set_enable(0);
            self.write_port_b(bits.0)?;
        }
        Ok(())
    }

    /// Burst one byte onto port B. Port A is untouched; it belongs to the keypad.
    fn write_port_b(&mut self, value: u8) -> Result<(), Mcp23017Error<I2C>> {
        registers::write_register(&mut self.i2c, self.address, registers::GPIOB, value)
            .map_err(Mcp23017Error::I2cError)
    }
}

/// Implement the `core::fmt::Write` trait, allowing the display to be used with the
/// `write!` macro. This is a convenience method for printing to the display.
impl<I2C, DELAY> core::fmt::Write for CharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        if let Err(_e) = self.print(s) {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait, allowing the display to be used with the
/// `uwriteln!` and `uwrite!` macros.
impl<I2C, DELAY> ufmt::uWrite for CharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    type Error = Mcp23017Error<I2C>;

    fn write_str(&mut self, s: &str) -> Result<(), Mcp23017Error<I2C>> {
        self.print(s)?;
        Ok(())
    }
}
