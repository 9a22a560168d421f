//! Sample acquisition task

use defmt::*;

use carsensor_core::acquisition::{Acquisition, CycleReport};
use carsensor_core::status::StatusCategory;

use super::Converter;
use crate::channels::{SENSOR_STATUS, STATUS};

/// Probe every sensor channel forever
#[embassy_executor::task]
pub async fn acquisition_task(mut acquisition: Acquisition<Converter>) {
    info!(
        "Acquisition task started ({} channels)",
        acquisition.channel_count()
    );

    let converters = acquisition.converter_count();
    let mut last = StatusCategory::Boot;

    let never = acquisition
        .run(&SENSOR_STATUS, |report: &CycleReport| {
            for (index, active, sample) in report.changes() {
                if let Some(raw) = sample {
                    info!("Channel {} -> {} (raw {})", index, active, raw);
                }
            }
            if report.has_failures() {
                warn!("{} channels failed this cycle", report.failure_count());
            }

            let status = StatusCategory::from_cycle(converters, report);
            if status != last {
                last = status;
                STATUS.signal(status);
            }
        })
        .await;
    match never {}
}
