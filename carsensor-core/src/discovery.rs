//! Device discovery on the controller bus
//!
//! Every candidate address gets one reset attempt. Chips that answer are
//! kept for the process lifetime; the rest are dropped silently.

use heapless::Vec;

use crate::status::StatusCategory;
use crate::traits::ProbeDevice;

/// Result of probing a candidate list
pub struct Discovery<D, const N: usize> {
    /// Devices that reset successfully, in candidate order (at most `N`)
    pub devices: Vec<D, N>,
    /// Number of candidates that answered, including any beyond `N`
    pub found: usize,
}

impl<D, const N: usize> Discovery<D, N> {
    /// Returns true if more devices answered than fit
    pub fn overflowed(&self) -> bool {
        self.found > self.devices.len()
    }
}

/// Reset every candidate and keep the ones that answer
pub async fn discover<D, I, const N: usize>(candidates: I) -> Discovery<D, N>
where
    D: ProbeDevice,
    I: IntoIterator<Item = D>,
{
    let mut devices = Vec::new();
    let mut found = 0;
    for mut device in candidates {
        if device.reset().await.is_err() {
            continue;
        }
        found += 1;
        #[cfg(feature = "defmt")]
        defmt::info!("Found device at {=u8:#04x}", device.address());
        // Past capacity the device is only counted
        let _ = devices.push(device);
    }
    Discovery { devices, found }
}

/// Check a converter count against what the board supports
pub fn classify_converters(found: usize, max: usize) -> Result<(), StatusCategory> {
    match found {
        0 => Err(StatusCategory::NoDevices),
        n if n > max => Err(StatusCategory::TooManyDevices),
        _ => Ok(()),
    }
}
