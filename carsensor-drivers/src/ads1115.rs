//! ADS1115 16-bit ADC (I2C)
//!
//! Four single-ended inputs measured one at a time in single-shot mode.
//!
//! # Registers
//!
//! All registers are 16 bits, MSB first. Writing only the pointer byte
//! selects the register for the following read.
//!
//! - `0x00` conversion result
//! - `0x01` config: OS (bit 15), MUX (14:12), PGA (11:9), MODE (8), rate and
//!   comparator settings below
//!
//! OS reads 0 while a conversion is in progress. Writing 1 starts a
//! single-shot conversion.

use carsensor_core::traits::{AnalogConverter, ProbeDevice};
use embedded_hal_async::i2c::I2c;

/// ADS1115 register addresses
pub mod reg {
    /// Last conversion result
    pub const CONVERSION: u8 = 0x00;
    /// Configuration and status
    pub const CONFIG: u8 = 0x01;
}

/// Address with ADDR tied to GND
pub const ADDRESS_GND: u8 = 0x48;
/// Address with ADDR tied to VDD
pub const ADDRESS_VDD: u8 = 0x49;
/// Address with ADDR tied to SDA
pub const ADDRESS_SDA: u8 = 0x4A;
/// Address with ADDR tied to SCL
pub const ADDRESS_SCL: u8 = 0x4B;

/// Power-on config: single-shot, ±2.048 V, 128 SPS, comparator off
pub const CONFIG_DEFAULT: u16 = 0x8583;

/// Operational status / single-shot start
const CONFIG_OS: u16 = 0x8000;

/// MUX value for input 0 against GND; inputs 1-3 follow in steps of 0x1000
const MUX_SINGLE_0: u16 = 0x4000;
const MUX_STEP: u16 = 0x1000;

/// Bits kept when selecting an input (OS and MUX cleared)
const MUX_CLEAR: u16 = 0x0FFF;

/// Bits kept when changing the range (PGA cleared)
const PGA_CLEAR: u16 = 0xF1FF;

/// Full-scale input range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Range {
    /// ±6.144 V
    Mv6144,
    /// ±4.096 V
    Mv4096,
    /// ±2.048 V (power-on default)
    Mv2048,
    /// ±1.024 V
    Mv1024,
    /// ±0.512 V
    Mv512,
    /// ±0.256 V
    Mv256,
}

impl Range {
    /// PGA field bits
    pub const fn bits(self) -> u16 {
        match self {
            Range::Mv6144 => 0x0000,
            Range::Mv4096 => 0x0200,
            Range::Mv2048 => 0x0400,
            Range::Mv1024 => 0x0600,
            Range::Mv512 => 0x0800,
            Range::Mv256 => 0x0A00,
        }
    }
}

/// One ADS1115 on a shared bus
pub struct Ads1115<I> {
    i2c: I,
    address: u8,
    range: Range,
}

impl<I: I2c> Ads1115<I> {
    /// Create a driver for the chip at `address`
    ///
    /// Nothing is sent until [`ProbeDevice::reset`].
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            range: Range::Mv6144,
        }
    }

    /// Range applied on every reset
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    /// Give back the bus handle
    pub fn release(self) -> I {
        self.i2c
    }

    async fn read_register(&mut self, register: u8) -> Result<u16, I::Error> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .await?;
        Ok(u16::from_be_bytes(buf))
    }

    async fn write_register(&mut self, register: u8, value: u16) -> Result<(), I::Error> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c.write(self.address, &[register, hi, lo]).await
    }

    /// Read-modify-write the config register
    async fn update_config(&mut self, f: impl FnOnce(u16) -> u16) -> Result<(), I::Error> {
        let config = self.read_register(reg::CONFIG).await?;
        self.write_register(reg::CONFIG, f(config)).await
    }

    /// Change the full-scale range
    pub async fn set_range(&mut self, range: Range) -> Result<(), I::Error> {
        self.update_config(|config| (config & PGA_CLEAR) | range.bits())
            .await
    }
}

impl<I: I2c> ProbeDevice for Ads1115<I> {
    type Error = I::Error;

    fn address(&self) -> u8 {
        self.address
    }

    async fn reset(&mut self) -> Result<(), I::Error> {
        self.write_register(reg::CONFIG, CONFIG_DEFAULT).await?;
        self.set_range(self.range).await?;
        self.select_channel(0).await
    }
}

impl<I: I2c> AnalogConverter for Ads1115<I> {
    async fn select_channel(&mut self, channel: u8) -> Result<(), I::Error> {
        let mux = MUX_SINGLE_0 + MUX_STEP * u16::from(channel & 0x03);
        self.update_config(|config| (config & MUX_CLEAR) | mux).await
    }

    async fn start_conversion(&mut self) -> Result<(), I::Error> {
        self.update_config(|config| config | CONFIG_OS).await
    }

    async fn is_busy(&mut self) -> Result<bool, I::Error> {
        Ok(self.read_register(reg::CONFIG).await? & CONFIG_OS == 0)
    }

    async fn read_raw(&mut self) -> Result<u16, I::Error> {
        self.read_register(reg::CONVERSION).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_bus::FakeBus;
    use embassy_futures::block_on;

    #[test]
    fn test_reset_sequence() {
        block_on(async {
            let mut adc = Ads1115::new(FakeBus::with_ads1115(ADDRESS_GND), ADDRESS_GND);
            adc.reset().await.unwrap();
            let bus = adc.release();
            // Default config, PGA cleared to ±6.144 V, input 0 selected
            assert_eq!(bus.config, 0x4183);
            assert_eq!(bus.config_writes.as_slice(), [0x8583, 0x8183, 0x4183]);
        });
    }

    #[test]
    fn test_missing_chip_fails_reset() {
        block_on(async {
            let mut adc = Ads1115::new(FakeBus::with_ads1115(ADDRESS_GND), ADDRESS_VDD);
            assert!(adc.reset().await.is_err());
        });
    }

    #[test]
    fn test_select_channel_sets_mux() {
        block_on(async {
            let mut adc = Ads1115::new(FakeBus::with_ads1115(ADDRESS_SDA), ADDRESS_SDA);
            adc.reset().await.unwrap();
            adc.select_channel(3).await.unwrap();
            assert_eq!(adc.release().config, 0x7183);
        });
    }

    #[test]
    fn test_conversion_cycle() {
        block_on(async {
            let mut bus = FakeBus::with_ads1115(ADDRESS_GND);
            bus.conversion = 0x1234;
            bus.busy_reads = 2;
            let mut adc = Ads1115::new(bus, ADDRESS_GND);
            adc.reset().await.unwrap();

            adc.start_conversion().await.unwrap();
            assert!(adc.is_busy().await.unwrap());
            assert!(adc.is_busy().await.unwrap());
            assert!(!adc.is_busy().await.unwrap());
            assert_eq!(adc.read_raw().await.unwrap(), 0x1234);
        });
    }

    #[test]
    fn test_custom_range() {
        block_on(async {
            let mut adc =
                Ads1115::new(FakeBus::with_ads1115(ADDRESS_GND), ADDRESS_GND).with_range(Range::Mv4096);
            adc.reset().await.unwrap();
            assert_eq!(adc.release().config & 0x0E00, Range::Mv4096.bits());
        });
    }
}
