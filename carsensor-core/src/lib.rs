//! Board-agnostic core logic for the Binky car sensor firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Device traits for the converter and expander chips
//! - Per-channel signal detection (rank/spread and rolling z-score)
//! - The sample acquisition loop
//! - The register bridge state machine and its bus service
//! - Output dispatch to expander chips
//! - Device discovery and status categories
//! - Board description and timing configuration
//!
//! The loops talk only through the channels in [`link`] and [`dispatch`];
//! each owns its mutable state outright.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

pub mod acquisition;
pub mod bridge;
pub mod config;
pub mod detect;
pub mod discovery;
pub mod dispatch;
pub mod link;
pub mod status;
pub mod traits;

#[cfg(test)]
mod mocks;
