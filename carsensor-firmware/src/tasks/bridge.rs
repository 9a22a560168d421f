//! Register bridge task

use defmt::*;

use carsensor_core::bridge::{supervise, BridgeError, BridgeLinks, RegisterBridge};
use carsensor_core::config::LinkTiming;
use carsensor_core::status::StatusCategory;
use carsensor_hal_rp2040::{HostTarget, IoPin, TargetError};
use embassy_rp::peripherals::I2C1;

use crate::channels::{OUTPUT_QUEUE, SENSOR_STATUS, STATUS};

/// Serve the host register map, restarting after bus failures
#[embassy_executor::task]
pub async fn bridge_task(
    mut target: HostTarget<'static, I2C1>,
    mut bridge: RegisterBridge<IoPin<'static>>,
    timing: LinkTiming,
) {
    info!("Bridge task started");

    let links = BridgeLinks {
        status: &SENSOR_STATUS,
        outputs: &OUTPUT_QUEUE,
        timing,
    };

    let never = supervise(
        &mut target,
        &mut bridge,
        &links,
        |error: &BridgeError<TargetError>| match error {
            BridgeError::Configure(e) => {
                error!("Host bus target setup failed: {}", e);
                STATUS.signal(StatusCategory::ConfigError);
            }
            BridgeError::Bus(e) => warn!("Host bus failed: {}, restarting", e),
        },
    )
    .await;
    match never {}
}
