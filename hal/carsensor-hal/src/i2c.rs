//! I2C bus abstractions
//!
//! The board talks I2C in two roles: as controller towards its ADC and
//! expander chips (covered by `embedded-hal-async`), and as target towards
//! the host. This module provides the target-role trait and the shared bus
//! configuration.

/// Phase of a host transaction, as seen by the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetEvent {
    /// Host wrote bytes (register address, optionally followed by a value)
    Receive,
    /// Host wants to read; answer with [`I2cTarget::reply`]
    Request,
    /// Transaction ended (stop condition)
    Finish,
}

/// I2C bus target (peripheral role)
///
/// `wait_for_event` is the blocking primitive the host-facing loop sits on.
/// It must be re-invoked promptly after each event, otherwise the host's
/// clock-stretch limit can be exceeded.
pub trait I2cTarget {
    /// Error type for target operations
    type Error;

    /// 7-bit address this target answers on
    fn address(&self) -> u8;

    /// Put the peripheral into target mode and start listening
    ///
    /// Called on every (re)start of the bus service, so it must also recover
    /// a peripheral left in an error state.
    async fn listen(&mut self) -> Result<(), Self::Error>;

    /// Wait for the next transaction phase
    ///
    /// For [`TargetEvent::Receive`] the written bytes are placed in `buf` and
    /// their count returned. Other events return a count of 0.
    async fn wait_for_event(&mut self, buf: &mut [u8]) -> Result<(TargetEvent, usize), Self::Error>;

    /// Answer a pending [`TargetEvent::Request`]
    async fn reply(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}
