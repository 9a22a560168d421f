//! Configuration types
//!
//! The board description is an immutable value built once at startup and
//! passed by reference; nothing here is mutated at runtime.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
