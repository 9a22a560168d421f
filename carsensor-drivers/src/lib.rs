//! Hardware driver implementations
//!
//! Concrete implementations of the device traits defined in carsensor-core,
//! written against `embedded-hal-async` I2C so they work on any bus handle,
//! including a shared-bus device:
//!
//! - ADS1115 four-input ADC ([`AnalogConverter`](carsensor_core::traits::AnalogConverter))
//! - PCF8574 eight-bit expander ([`OutputExpander`](carsensor_core::traits::OutputExpander))

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod ads1115;
pub mod pcf8574;

#[cfg(test)]
mod fake_bus;

pub use ads1115::Ads1115;
pub use pcf8574::Pcf8574;
