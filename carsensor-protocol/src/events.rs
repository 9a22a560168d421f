//! Shape decoding of raw target events
//!
//! This is the only protocol work done on the bus-servicing path: classify
//! the byte count of a Receive and remember which register was addressed so
//! a following Request can carry it.

use carsensor_hal::TargetEvent;

/// Size of the receive buffer handed to the target peripheral
pub const RAW_EVENT_BUF: usize = 8;

/// A transaction phase with its payload decoded by shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Host write: nothing, register address only, or address and value
    Receive { register: Option<u8>, value: Option<u8> },
    /// Host read of the previously addressed register
    Request { register: u8 },
    /// End of transaction
    Finish,
}

/// Turns raw target events into [`BusEvent`]s
///
/// Keeps the last addressed register across transactions, so a plain read
/// without a preceding address write reads the same register again.
#[derive(Debug, Clone, Default)]
pub struct EventDecoder {
    addressed: u8,
}

impl EventDecoder {
    /// Create a decoder pointing at register 0x00
    pub const fn new() -> Self {
        Self { addressed: 0 }
    }

    /// Register the next Request will refer to
    pub fn addressed(&self) -> u8 {
        self.addressed
    }

    /// Decode one event; `payload` holds the bytes received with it
    pub fn decode(&mut self, kind: TargetEvent, payload: &[u8]) -> BusEvent {
        match kind {
            TargetEvent::Receive => {
                let register = payload.first().copied();
                let value = payload.get(1).copied();
                if let Some(reg) = register {
                    self.addressed = reg;
                }
                BusEvent::Receive { register, value }
            }
            TargetEvent::Request => BusEvent::Request {
                register: self.addressed,
            },
            TargetEvent::Finish => BusEvent::Finish,
        }
    }
}
