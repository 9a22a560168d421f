//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use carsensor_core::dispatch::OutputQueue;
use carsensor_core::link::Rendezvous;
use carsensor_core::status::StatusCategory;

/// Sensor status bytes, handed from acquisition to the register bridge
///
/// Acquisition blocks on each byte until the bridge took it.
pub static SENSOR_STATUS: Rendezvous<CriticalSectionRawMutex, u8> = Rendezvous::new();

/// Expander writes from the register bridge to the output dispatcher
pub static OUTPUT_QUEUE: OutputQueue<CriticalSectionRawMutex> = OutputQueue::new();

/// Latest board status for the indicator (only the newest value matters)
pub static STATUS: Signal<CriticalSectionRawMutex, StatusCategory> = Signal::new();
