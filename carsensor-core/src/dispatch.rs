//! Output dispatch to expander chips
//!
//! The register bridge enqueues [`OutputRequest`]s without ever waiting on
//! the controller bus. A single [`OutputDispatcher`] drains the queue in
//! FIFO order and performs the writes.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration};
use heapless::Vec;

use crate::config::MAX_EXPANDERS;
use crate::traits::OutputExpander;

/// Capacity of the output request queue
pub const OUTPUT_QUEUE_DEPTH: usize = 8;

/// Queue between the register bridge and the dispatcher
pub type OutputQueue<M> = Channel<M, OutputRequest, OUTPUT_QUEUE_DEPTH>;

/// Write `value` to expander number `device`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputRequest {
    pub device: u8,
    pub value: u8,
}

/// What happened to one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// Written to the expander
    Written,
    /// No expander with that index was detected
    Dropped,
    /// The expander did not accept the write
    Failed,
}

/// Enqueue a request, giving up after `timeout`
///
/// Returns false if the queue stayed full for the whole budget; the request
/// is then dropped.
pub async fn forward_output<M: RawMutex>(
    queue: &OutputQueue<M>,
    request: OutputRequest,
    timeout: Duration,
) -> bool {
    with_timeout(timeout, queue.send(request)).await.is_ok()
}

/// Sole consumer of the output queue
pub struct OutputDispatcher<E> {
    expanders: Vec<E, MAX_EXPANDERS>,
}

impl<E: OutputExpander> OutputDispatcher<E> {
    pub fn new(expanders: Vec<E, MAX_EXPANDERS>) -> Self {
        Self { expanders }
    }

    /// Number of expanders detected at boot
    pub fn device_count(&self) -> usize {
        self.expanders.len()
    }

    /// Perform one request
    pub async fn dispatch(&mut self, request: OutputRequest) -> DispatchOutcome {
        let Some(expander) = self.expanders.get_mut(request.device as usize) else {
            return DispatchOutcome::Dropped;
        };
        match expander.write_bits(request.value).await {
            Ok(()) => DispatchOutcome::Written,
            Err(_) => DispatchOutcome::Failed,
        }
    }

    /// Drain the queue forever
    pub async fn run<M: RawMutex>(&mut self, queue: &OutputQueue<M>) -> Infallible {
        loop {
            let request = queue.receive().await;
            if self.dispatch(request).await == DispatchOutcome::Failed {
                #[cfg(feature = "defmt")]
                defmt::warn!("Expander {} rejected {=u8:#04x}", request.device, request.value);
            }
        }
    }

    /// Access the expanders (diagnostics and tests)
    pub fn expanders(&self) -> &[E] {
        &self.expanders
    }
}
