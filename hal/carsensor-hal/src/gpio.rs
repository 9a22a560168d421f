//! GPIO pin abstractions
//!
//! Provides traits for the strap input and the host-driven actuator pins
//! that can be implemented by chip-specific HALs.

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Actuator output driven by host register writes
///
/// A pin starts in digital mode. Whether it may be moved to PWM mode is a
/// board property; callers only invoke [`ActuatorPin::set_compare`] on pins
/// the board declares PWM-capable.
pub trait ActuatorPin {
    /// Drive the pin high, or release it so the pull-down holds it low
    fn set_level(&mut self, high: bool);

    /// Output PWM with the given compare value
    ///
    /// A compare of 0 keeps the output fully off.
    fn set_compare(&mut self, compare: u16);
}
