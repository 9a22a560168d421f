//! Opaque status categories for the board indicator
//!
//! The core only reports a category. How a category looks (colour, blink)
//! is decided by the indicator driver in the firmware.

use crate::acquisition::CycleReport;

/// What the board is doing, as shown on the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCategory {
    /// Starting up, nothing probed yet
    Boot,
    /// A bus could not be put into the needed mode
    ConfigError,
    /// No converter answered during discovery
    NoDevices,
    /// More converters answered than the status byte can cover
    TooManyDevices,
    /// Probing normally
    Nominal {
        /// Converters in use
        converters: u8,
        /// Channels currently active
        active: u8,
    },
    /// The last acquisition cycle had failures
    Error,
}

impl StatusCategory {
    /// Category after an acquisition cycle
    pub fn from_cycle(converters: u8, report: &CycleReport) -> Self {
        if report.has_failures() {
            StatusCategory::Error
        } else {
            StatusCategory::Nominal {
                converters,
                active: report.active,
            }
        }
    }

    /// Returns true for categories that indicate a fault
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            StatusCategory::ConfigError
                | StatusCategory::NoDevices
                | StatusCategory::TooManyDevices
                | StatusCategory::Error
        )
    }
}
