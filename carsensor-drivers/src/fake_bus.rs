//! In-memory I2C bus with one simulated chip, for driver tests

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use embedded_hal_async::i2c::I2c;
use heapless::Vec;

enum Chip {
    Ads1115,
    Pcf8574,
}

pub struct FakeBus {
    chip: Chip,
    address: u8,
    pointer: u8,
    /// ADS1115 config register as last written
    pub config: u16,
    pub conversion: u16,
    /// Config reads that report busy after a conversion starts
    pub busy_reads: u32,
    remaining: u32,
    pub config_writes: Vec<u16, 16>,
    /// Bytes written to the PCF8574
    pub outputs: Vec<u8, 16>,
}

impl FakeBus {
    fn new(chip: Chip, address: u8) -> Self {
        Self {
            chip,
            address,
            pointer: 0,
            config: 0x8583,
            conversion: 0,
            busy_reads: 0,
            remaining: 0,
            config_writes: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_ads1115(address: u8) -> Self {
        Self::new(Chip::Ads1115, address)
    }

    pub fn with_pcf8574(address: u8) -> Self {
        Self::new(Chip::Pcf8574, address)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        match self.chip {
            Chip::Pcf8574 => {
                for &b in bytes {
                    self.outputs.push(b).map_err(|_| ErrorKind::Overrun)?;
                }
            }
            Chip::Ads1115 => {
                let Some((&pointer, data)) = bytes.split_first() else {
                    return Ok(());
                };
                self.pointer = pointer;
                if let [hi, lo] = *data {
                    let value = u16::from_be_bytes([hi, lo]);
                    if pointer == 0x01 {
                        self.config = value;
                        self.config_writes.push(value).map_err(|_| ErrorKind::Overrun)?;
                        if value & 0x8000 != 0 {
                            self.remaining = self.busy_reads;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), ErrorKind> {
        let value = match self.pointer {
            0x00 => self.conversion,
            0x01 if self.remaining > 0 => {
                self.remaining -= 1;
                self.config & 0x7FFF
            }
            0x01 => self.config | 0x8000,
            _ => return Err(ErrorKind::Other),
        };
        for (dst, src) in buf.iter_mut().zip(value.to_be_bytes()) {
            *dst = src;
        }
        Ok(())
    }
}

impl ErrorType for FakeBus {
    type Error = ErrorKind;
}

impl I2c for FakeBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.write(bytes)?,
                Operation::Read(buf) => self.read(buf)?,
            }
        }
        Ok(())
    }
}
