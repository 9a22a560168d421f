//! PWM timing
//!
//! Actuator PWM runs at a fixed period of roughly 1/60 s. A duty byte from
//! the host maps onto the counter range as `top * duty / 256`.

/// Actuation frequency for PWM outputs
pub const ACTUATION_HZ: u32 = 60;

/// Largest counter top a 16-bit PWM slice supports
const MAX_TOP: u32 = u16::MAX as u32;

/// Counter setup for a PWM slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmTiming {
    /// Integer clock divider
    pub divider: u8,
    /// Counter wraps after `top`, so the period is `top + 1` ticks
    pub top: u16,
}

impl PwmTiming {
    /// Pick the smallest integer divider that lets `frequency_hz` fit the counter
    ///
    /// Returns `None` if no divider up to 255 is large enough.
    pub const fn for_frequency(clock_hz: u32, frequency_hz: u32) -> Option<Self> {
        if frequency_hz == 0 {
            return None;
        }
        let span = (MAX_TOP + 1) * frequency_hz;
        let divider = clock_hz.div_ceil(span);
        let divider = if divider == 0 { 1 } else { divider };
        if divider > u8::MAX as u32 {
            return None;
        }
        let ticks = clock_hz / (divider * frequency_hz);
        if ticks == 0 {
            return None;
        }
        Some(Self {
            divider: divider as u8,
            top: (ticks - 1) as u16,
        })
    }

    /// Compare value for a host duty byte (0 is fully off)
    pub const fn compare_for_duty(&self, duty: u8) -> u16 {
        compare_for_duty(self.top, duty)
    }
}

/// Map a duty byte onto `0..top`
pub const fn compare_for_duty(top: u16, duty: u8) -> u16 {
    ((top as u32 * duty as u32) / 256) as u16
}
