//! PCF8574 8-bit I/O expander (I2C)
//!
//! The chip has no registers: every written byte goes straight to the eight
//! quasi-bidirectional outputs.

use carsensor_core::traits::{OutputExpander, ProbeDevice};
use embedded_hal_async::i2c::I2c;

/// Lowest address (A2..A0 tied low)
pub const ADDRESS_BASE: u8 = 0x20;

pub struct Pcf8574<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Pcf8574<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> ProbeDevice for Pcf8574<I> {
    type Error = I::Error;

    fn address(&self) -> u8 {
        self.address
    }

    /// Drive every output low
    async fn reset(&mut self) -> Result<(), I::Error> {
        self.write_bits(0).await
    }
}

impl<I: I2c> OutputExpander for Pcf8574<I> {
    async fn write_bits(&mut self, value: u8) -> Result<(), I::Error> {
        self.i2c.write(self.address, &[value]).await
    }
}
