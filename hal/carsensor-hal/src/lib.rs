//! Car sensor Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that are implemented
//! by chip-specific HALs (RP2040 today). The register bridge and the
//! acquisition logic in `carsensor-core` only see these traits, which keeps
//! them testable on a host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (carsensor-firmware)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  carsensor-core / carsensor-protocol    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  carsensor-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ carsensor-hal-│
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Strap sensing
//! - [`gpio::ActuatorPin`] - Host-driven outputs (digital or PWM)
//! - [`i2c::I2cTarget`] - I2C target (peripheral) role

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

pub mod gpio;
pub mod i2c;
pub mod pwm;

// Re-export key traits at crate root for convenience
pub use gpio::{ActuatorPin, InputPin};
pub use i2c::{I2cConfig, I2cTarget, TargetEvent};
pub use pwm::PwmTiming;
