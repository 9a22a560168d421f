//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the device drivers on the controller-side I2C bus.

pub mod converter;
pub mod device;
pub mod expander;

pub use converter::AnalogConverter;
pub use device::ProbeDevice;
pub use expander::OutputExpander;
