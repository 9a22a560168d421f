//! Read replies
//!
//! Known registers answer with one byte. Reads of anything outside the map
//! answer with the two-byte sentinel.

use heapless::Vec;

/// Answer to reads of unknown registers
pub const SENTINEL: [u8; 2] = [0xFF, 0xFF];

/// Longest reply the board sends
pub const MAX_REPLY_LEN: usize = 2;

/// Bytes sent back for a Request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    bytes: Vec<u8, MAX_REPLY_LEN>,
}

impl Reply {
    /// Single-byte register value
    pub fn byte(value: u8) -> Self {
        let mut bytes = Vec::new();
        // Capacity is 2, a single push cannot fail
        let _ = bytes.push(value);
        Self { bytes }
    }

    /// The `0xFF 0xFF` answer for unknown registers
    pub fn sentinel() -> Self {
        Self {
            bytes: Vec::from_slice(&SENTINEL).unwrap_or_default(),
        }
    }

    /// Raw bytes to put on the bus
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns true if this is the unknown-register answer
    pub fn is_sentinel(&self) -> bool {
        self.bytes.as_slice() == SENTINEL
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Reply {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Reply({=[u8]:#04x})", self.bytes.as_slice())
    }
}
