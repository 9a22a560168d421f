//! Devices found by probing the controller bus

/// A chip at a fixed bus address that can be reset to its baseline state
///
/// Discovery keeps every candidate whose `reset` succeeds.
pub trait ProbeDevice {
    /// Error type for bus operations
    type Error;

    /// 7-bit bus address of the chip
    fn address(&self) -> u8;

    /// Reset the chip and re-issue its baseline configuration
    async fn reset(&mut self) -> Result<(), Self::Error>;
}
