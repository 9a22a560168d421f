//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod acquisition;
pub mod bridge;
pub mod dispatch;
pub mod indicator;

pub use acquisition::acquisition_task;
pub use bridge::bridge_task;
pub use dispatch::dispatch_task;
pub use indicator::indicator_task;

use carsensor_drivers::{Ads1115, Pcf8574};
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

/// Controller-role bus towards the converters and expanders
pub type DeviceBus = I2c<'static, I2C0, Async>;

/// One device's handle on the shared bus
pub type BusHandle = I2cDevice<'static, NoopRawMutex, DeviceBus>;

pub type Converter = Ads1115<BusHandle>;
pub type Expander = Pcf8574<BusHandle>;
