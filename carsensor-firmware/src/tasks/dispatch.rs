//! Output dispatcher task

use defmt::*;

use carsensor_core::dispatch::OutputDispatcher;

use super::Expander;
use crate::channels::OUTPUT_QUEUE;

/// Write queued expander outputs forever
#[embassy_executor::task]
pub async fn dispatch_task(mut dispatcher: OutputDispatcher<Expander>) {
    info!(
        "Dispatch task started ({} expanders)",
        dispatcher.device_count()
    );
    let never = dispatcher.run(&OUTPUT_QUEUE).await;
    match never {}
}
