//! Analog converter trait

use super::device::ProbeDevice;

/// Multi-input ADC running single-shot conversions
///
/// One conversion at a time: select an input, start, wait until not busy,
/// read the result.
pub trait AnalogConverter: ProbeDevice {
    /// Route input `channel` to the converter
    async fn select_channel(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Trigger a single conversion on the selected input
    async fn start_conversion(&mut self) -> Result<(), Self::Error>;

    /// Returns true while a conversion is in progress
    async fn is_busy(&mut self) -> Result<bool, Self::Error>;

    /// Raw 16-bit result of the last conversion
    async fn read_raw(&mut self) -> Result<u16, Self::Error>;
}
