//! Board configuration compiled in from `board.toml`

use carsensor_core::config::{AcquisitionTiming, BoardDescription, DetectorKind, LinkTiming};
use embassy_time::Duration;

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

/// Pause between converter discovery attempts
pub const DEVICE_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Pause before the strap is sampled
pub const BOOT_DELAY: Duration = Duration::from_millis(BOOT_DELAY_MS);

/// Board description with the configured bus addresses
pub fn board() -> BoardDescription {
    BoardDescription {
        primary_address: PRIMARY_ADDRESS,
        alternate_address: ALTERNATE_ADDRESS,
        ..BoardDescription::BINKY_CAR_SENSOR
    }
}

pub fn acquisition_timing() -> AcquisitionTiming {
    AcquisitionTiming {
        cycle_interval: Duration::from_millis(CYCLE_INTERVAL_MS),
        conversion_timeout: Duration::from_millis(CONVERSION_TIMEOUT_MS),
        settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
        ..AcquisitionTiming::default()
    }
}

pub fn link_timing() -> LinkTiming {
    LinkTiming::default()
}
