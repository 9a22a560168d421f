//! Car Sensor Register Protocol
//!
//! This crate defines the byte-addressed register protocol the board serves
//! to its host controller as an I2C target. The host selects a register by
//! writing its address, then either writes one value byte or reads the
//! register back.
//!
//! # Register Map
//!
//! ```text
//! ┌───────────┬─────┬──────────────────────────────────────────┐
//! │ Address   │ Dir │ Meaning                                  │
//! ├───────────┼─────┼──────────────────────────────────────────┤
//! │ 0x00-0x02 │ R   │ firmware version major / minor / patch   │
//! │ 0x03      │ R   │ number of sensor channels (0-8)          │
//! │ 0x04      │ R   │ number of expander output bits           │
//! │ 0x10      │ R   │ sticky sensor status                     │
//! │ 0x20      │ W   │ local actuator byte                      │
//! │ 0x21-0x28 │ W   │ expander N output byte                   │
//! │ 0x30-0x37 │ W   │ pin N PWM duty (switches pin to PWM)     │
//! │ other     │ R   │ 0xFF 0xFF                                │
//! └───────────┴─────┴──────────────────────────────────────────┘
//! ```
//!
//! The bus-facing loop only shape-decodes raw target events into
//! [`BusEvent`]s; register semantics live in `carsensor-core`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod events;
pub mod registers;
pub mod reply;

pub use events::{BusEvent, EventDecoder, RAW_EVENT_BUF};
pub use registers::{Direction, Register, FIRMWARE_VERSION};
pub use reply::{Reply, SENTINEL};
