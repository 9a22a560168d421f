//! Host-facing register bridge
//!
//! [`state`] holds the register semantics as a synchronous state machine;
//! [`service`] runs it against an I2C target peripheral.

pub mod service;
pub mod state;

pub use service::{listen, supervise, BridgeError, BridgeLinks};
pub use state::{BridgeContext, EventTrace, Outcome, RegisterBridge, ResponseState};
