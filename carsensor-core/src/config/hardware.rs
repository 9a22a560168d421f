//! Hardware description of the board
//!
//! Fixed pin roles, bus addresses and device candidate lists. One value of
//! [`BoardDescription`] is constructed at startup and shared by reference.

use carsensor_hal::InputPin;
use carsensor_protocol::FIRMWARE_VERSION;

/// Number of host-driven actuator pins on the board
pub const ACTUATOR_PINS: usize = 8;

/// Analog inputs per converter chip
pub const CHANNELS_PER_CONVERTER: u8 = 4;

/// Most converters the status byte can cover (4 channels each)
pub const MAX_CONVERTERS: usize = 2;

/// Most sensor channels (one status bit each)
pub const MAX_CHANNELS: usize = 8;

/// Most expanders the register map can address (0x21-0x28)
pub const MAX_EXPANDERS: usize = 8;

/// Which of the two bus addresses the board answers on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressKind {
    /// Strap left high
    Primary,
    /// Strap pulled low
    Alternate,
}

/// Immutable description of one board class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardDescription {
    /// Host bus address when the strap is high
    pub primary_address: u8,
    /// Host bus address when the strap is pulled low
    pub alternate_address: u8,
    /// Firmware version (major, minor, patch)
    pub version: [u8; 3],
    /// Actuator pin that doubles as the address strap
    pub strap_pin: u8,
    /// Bit N set when actuator pin N has its own PWM channel
    pub pwm_capable: u8,
    /// Bus addresses probed for converter chips
    pub converter_candidates: &'static [u8],
    /// Bus addresses probed for expander chips
    pub expander_candidates: &'static [u8],
}

impl BoardDescription {
    /// The Binky car sensor board
    ///
    /// Actuator pins 1-5 sit on distinct PWM slice outputs. Pin 0 is the
    /// strap and pins 6/7 share slice outputs with pins 0/1.
    pub const BINKY_CAR_SENSOR: Self = Self {
        primary_address: 0x34,
        alternate_address: 0x35,
        version: FIRMWARE_VERSION,
        strap_pin: 0,
        pwm_capable: 0b0011_1110,
        converter_candidates: &[0x48, 0x49, 0x4A, 0x4B],
        expander_candidates: &[0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27],
    };

    /// Address kind selected by the strap level
    pub fn address_kind_for(&self, strap_low: bool) -> AddressKind {
        if strap_low {
            AddressKind::Alternate
        } else {
            AddressKind::Primary
        }
    }

    /// Sample the strap pin once and pick the address kind
    pub fn sample_strap<P: InputPin>(&self, strap: &P) -> AddressKind {
        self.address_kind_for(strap.is_low())
    }

    /// 7-bit bus address for an address kind
    pub fn address(&self, kind: AddressKind) -> u8 {
        match kind {
            AddressKind::Primary => self.primary_address,
            AddressKind::Alternate => self.alternate_address,
        }
    }

    /// Returns true if actuator `pin` can be switched to PWM
    pub fn supports_pwm(&self, pin: u8) -> bool {
        (pin as usize) < ACTUATOR_PINS && self.pwm_capable & (1 << pin) != 0
    }
}

impl Default for BoardDescription {
    fn default() -> Self {
        Self::BINKY_CAR_SENSOR
    }
}
