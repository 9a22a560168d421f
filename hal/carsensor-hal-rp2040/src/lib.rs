//! RP2040-specific HAL for the car sensor firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `carsensor-hal` traits:
//!
//! - I2C target adapter for the host bus (implements `carsensor_hal::I2cTarget`)
//! - Actuator pins, switched through SIO or driven by a PWM slice
//! - Strap input sampled once at boot
//! - PWM slice mapping and counter configuration

#![no_std]

pub mod actuator;
pub mod pwm;
pub mod target;

pub use actuator::{IoPin, StrapInput};
pub use target::{target_config, HostTarget, TargetError};
