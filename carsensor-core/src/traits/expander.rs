//! Output expander trait

use super::device::ProbeDevice;

/// 8-bit output port on the controller bus
pub trait OutputExpander: ProbeDevice {
    /// Drive all eight outputs at once
    async fn write_bits(&mut self, value: u8) -> Result<(), Self::Error>;
}
