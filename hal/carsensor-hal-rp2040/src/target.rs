//! I2C target adapter
//!
//! The RP2040 target peripheral reports whole transactions (`Write`, `Read`,
//! `WriteRead`). They are split back into the Receive / Request / Finish
//! phases the register bridge works with:
//!
//! | Peripheral command | Events                     |
//! |--------------------|----------------------------|
//! | `Write(n)`         | Receive, Finish            |
//! | `WriteRead(n)`     | Receive, Request, Finish   |
//! | `Read`             | Request, Finish            |
//!
//! General calls are not part of the register protocol and are skipped.

use carsensor_hal::{I2cTarget, TargetEvent};
use embassy_rp::i2c::Instance;
use embassy_rp::i2c_slave::{self, Command, I2cSlave};

/// Byte sent after the reply if the host clocks out more than we wrote
const FILL_BYTE: u8 = 0xFF;

/// Errors from the target peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetError {
    /// Host aborted the transaction
    Abort,
    /// Host wrote more than the receive buffer holds
    Overrun,
    /// Reply was not accepted by the peripheral
    Reply,
    /// A reply was attempted without a pending read
    NoRequest,
}

impl From<i2c_slave::Error> for TargetError {
    fn from(e: i2c_slave::Error) -> Self {
        match e {
            i2c_slave::Error::Abort(_) => TargetError::Abort,
            i2c_slave::Error::PartialWrite(_) | i2c_slave::Error::PartialGeneralCall(_) => {
                TargetError::Overrun
            }
            _ => TargetError::Reply,
        }
    }
}

/// Peripheral config for answering on `address`
///
/// The board has external pull-ups on the host bus.
pub fn target_config(address: u8) -> i2c_slave::Config {
    let mut config = i2c_slave::Config::default();
    config.addr = u16::from(address);
    config.general_call = false;
    config.scl_pullup = false;
    config.sda_pullup = false;
    config
}

/// Host-facing bus target
pub struct HostTarget<'d, T: Instance> {
    bus: I2cSlave<'d, T>,
    address: u8,
    pending_request: bool,
    pending_finish: bool,
}

impl<'d, T: Instance> HostTarget<'d, T> {
    /// Wrap a target peripheral already configured for `address`
    pub fn new(bus: I2cSlave<'d, T>, address: u8) -> Self {
        Self {
            bus,
            address,
            pending_request: false,
            pending_finish: false,
        }
    }
}

impl<T: Instance> I2cTarget for HostTarget<'_, T> {
    type Error = TargetError;

    fn address(&self) -> u8 {
        self.address
    }

    async fn listen(&mut self) -> Result<(), TargetError> {
        self.bus.reset();
        self.pending_request = false;
        self.pending_finish = false;
        Ok(())
    }

    async fn wait_for_event(&mut self, buf: &mut [u8]) -> Result<(TargetEvent, usize), TargetError> {
        if self.pending_request {
            self.pending_request = false;
            return Ok((TargetEvent::Request, 0));
        }
        if self.pending_finish {
            self.pending_finish = false;
            return Ok((TargetEvent::Finish, 0));
        }

        loop {
            match self.bus.listen(buf).await? {
                Command::Write(len) => {
                    self.pending_finish = true;
                    return Ok((TargetEvent::Receive, len));
                }
                Command::WriteRead(len) => {
                    self.pending_request = true;
                    return Ok((TargetEvent::Receive, len));
                }
                Command::Read => return Ok((TargetEvent::Request, 0)),
                Command::GeneralCall(_) => continue,
            }
        }
    }

    async fn reply(&mut self, data: &[u8]) -> Result<(), TargetError> {
        if self.pending_request {
            return Err(TargetError::NoRequest);
        }
        self.bus.respond_and_fill(data, FILL_BYTE).await?;
        self.pending_finish = true;
        Ok(())
    }
}
