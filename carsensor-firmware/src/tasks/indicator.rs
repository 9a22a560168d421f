//! WS2812 status indicator task

use defmt::*;

use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;

use crate::channels::STATUS;
use crate::indicator::colour;

/// Show the latest status category
#[embassy_executor::task]
pub async fn indicator_task(mut led: PioWs2812<'static, PIO0, 0, 1>) {
    info!("Indicator task started");

    loop {
        let status = STATUS.wait().await;
        debug!("Indicator: {}", status);
        led.write(&[colour(status)]).await;
    }
}
