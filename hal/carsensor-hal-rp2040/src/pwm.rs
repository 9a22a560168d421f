//! PWM slice helpers
//!
//! GPIO n is wired to slice `(n / 2) % 8`, channel A for even n and channel B
//! for odd n.

use carsensor_hal::PwmTiming;
use embassy_rp::pwm::Config;

/// Slice channel a GPIO is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SliceChannel {
    A,
    B,
}

/// Slice number and channel for a GPIO
pub const fn slice_for_gpio(gpio: u8) -> (u8, SliceChannel) {
    let channel = if gpio % 2 == 0 {
        SliceChannel::A
    } else {
        SliceChannel::B
    };
    ((gpio / 2) % 8, channel)
}

/// Slice config for `timing` with both outputs off
pub fn slice_config(timing: PwmTiming) -> Config {
    let mut config = Config::default();
    config.divider = timing.divider.into();
    config.top = timing.top;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Timing for the actuation frequency at the current system clock
pub fn actuation_timing() -> Option<PwmTiming> {
    PwmTiming::for_frequency(
        embassy_rp::clocks::clk_sys_freq(),
        carsensor_hal::pwm::ACTUATION_HZ,
    )
}
