//! MCP23017 register map and low-level register access.
//!
//! Both drivers in this crate assume the expander's reset addressing mode, `IOCON.BANK = 0`,
//! where the A and B registers of each function sit at sequential addresses. With sequential
//! operation enabled, a multi-byte write walks from the port A register into its port B
//! neighbor, which is why single-register writes in this crate carry exactly one data byte
//! unless the caller means to touch both ports.
//!
//! Every write transaction is `[register, value]`; reads address the register with a write
//! and clock the data back in the same transaction.

use embedded_hal::i2c;

/// I/O direction. A bit set to 1 configures the pin as an input (reset state).
pub const IODIRA: u8 = 0x00;
pub const IODIRB: u8 = 0x01;

/// Input polarity. A bit set to 1 makes the GPIO bit reflect the inverted pin state.
pub const IPOLA: u8 = 0x02;
pub const IPOLB: u8 = 0x03;

/// Interrupt-on-change enable.
pub const GPINTENA: u8 = 0x04;
pub const GPINTENB: u8 = 0x05;

/// Default compare value for interrupt-on-change.
pub const DEFVALA: u8 = 0x06;
pub const DEFVALB: u8 = 0x07;

/// Interrupt control. A bit set to 1 compares the pin against DEFVAL, 0 against its previous value.
pub const INTCONA: u8 = 0x08;
pub const INTCONB: u8 = 0x09;

/// Expander configuration: BANK, MIRROR, SEQOP, DISSLW, HAEN, ODR, INTPOL.
pub const IOCONA: u8 = 0x0A;
pub const IOCONB: u8 = 0x0B;

/// Pull-up enable. A bit set to 1 enables the pin's 100k pull-up resistor.
pub const GPPUA: u8 = 0x0C;
pub const GPPUB: u8 = 0x0D;

/// Interrupt flag (read-only). A bit set to 1 means the pin caused the interrupt.
pub const INTFA: u8 = 0x0E;
pub const INTFB: u8 = 0x0F;

/// Pin state captured at the time of the interrupt (read-only).
pub const INTCAPA: u8 = 0x10;
pub const INTCAPB: u8 = 0x11;

/// Port pin state.
pub const GPIOA: u8 = 0x12;
pub const GPIOB: u8 = 0x13;

/// Output latch.
pub const OLATA: u8 = 0x14;
pub const OLATB: u8 = 0x15;

/// IOCON value used at initialization: BANK=0 sequential addressing, SDA slew rate
/// control disabled. Matches the addressing the register constants above assume.
pub const IOCON_SEQUENTIAL: u8 = 0x10;

pub(crate) fn write_register<I2C>(
    i2c: &mut I2C,
    address: u8,
    register: u8,
    value: u8,
) -> Result<(), I2C::Error>
where
    I2C: i2c::I2c,
{
    i2c.write(address, &[register, value])
}

pub(crate) fn read_register<I2C>(
    i2c: &mut I2C,
    address: u8,
    register: u8,
) -> Result<u8, I2C::Error>
where
    I2C: i2c::I2c,
{
    let mut buffer = [0u8; 1];
    i2c.write_read(address, &[register], &mut buffer)?;
    Ok(buffer[0])
}

/// Reads a port A/B register pair starting at `register`. Port A lands in the low byte.
pub(crate) fn read_register_pair<I2C>(
    i2c: &mut I2C,
    address: u8,
    register: u8,
) -> Result<u16, I2C::Error>
where
    I2C: i2c::I2c,
{
    let mut buffer = [0u8; 2];
    i2c.write_read(address, &[register], &mut buffer)?;
    Ok(u16::from_le_bytes(buffer))
}
